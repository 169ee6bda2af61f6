//! Request-line router.
//!
//! The router maps a peripheral's hardware request signal onto one of the
//! controller's request lines. Binding is last-writer-wins per line; the
//! router does not arbitrate cross-channel uniqueness, callers serialize
//! line assignment above this layer.
//!
//! Disabling a line keeps its peripheral binding. Re-enabling always takes
//! a peripheral argument, so a stale binding can never be revived by
//! accident.

use super::error::{ConfigError, ConfigResult};

/// One router slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct LineEntry {
    peripheral: u8,
    enabled: bool,
    overrun: bool,
    bound: bool,
}

/// Fixed-size request-line table shared by all channels of one controller.
///
/// # Example
///
/// ```ignore
/// let mut router: RequestRouter<16> = RequestRouter::new();
/// router.enable(3, 7)?;
/// assert!(router.is_enabled(3)?);
/// assert_eq!(router.peripheral(3)?, Some(7));
/// ```
#[derive(Debug)]
pub struct RequestRouter<const LINES: usize> {
    lines: [LineEntry; LINES],
}

impl<const LINES: usize> Default for RequestRouter<LINES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const LINES: usize> RequestRouter<LINES> {
    /// Create a router with every line disabled and unbound.
    #[must_use]
    pub const fn new() -> Self {
        const IDLE: LineEntry = LineEntry {
            peripheral: 0,
            enabled: false,
            overrun: false,
            bound: false,
        };
        Self {
            lines: [IDLE; LINES],
        }
    }

    /// Number of lines in the table.
    #[must_use]
    pub const fn line_count(&self) -> usize {
        LINES
    }

    const fn check(&self, line: u8) -> ConfigResult<usize> {
        if (line as usize) < LINES {
            Ok(line as usize)
        } else {
            Err(ConfigError::InvalidRequestLine)
        }
    }

    /// Bind `peripheral` to `line` and enable it.
    ///
    /// Idempotent; re-binding an enabled line simply overwrites the
    /// selector (last writer wins).
    pub fn enable(&mut self, line: u8, peripheral: u8) -> ConfigResult<()> {
        let idx = self.check(line)?;
        self.lines[idx].peripheral = peripheral;
        self.lines[idx].enabled = true;
        self.lines[idx].bound = true;
        Ok(())
    }

    /// Disable `line` while keeping its peripheral binding.
    pub fn disable(&mut self, line: u8) -> ConfigResult<()> {
        let idx = self.check(line)?;
        self.lines[idx].enabled = false;
        Ok(())
    }

    /// Disable then re-enable `line` with its existing binding.
    ///
    /// Recovery path after a protocol violation on the line; also drops
    /// the overrun flag.
    ///
    /// # Errors
    ///
    /// A line that was never bound has no peripheral to re-enable with and
    /// reports [`ConfigError::InvalidRequestLine`].
    pub fn clear(&mut self, line: u8) -> ConfigResult<()> {
        let idx = self.check(line)?;
        if !self.lines[idx].bound {
            return Err(ConfigError::InvalidRequestLine);
        }
        self.lines[idx].enabled = false;
        self.lines[idx].overrun = false;
        self.lines[idx].enabled = true;
        Ok(())
    }

    /// True when `line` is enabled.
    pub fn is_enabled(&self, line: u8) -> ConfigResult<bool> {
        let idx = self.check(line)?;
        Ok(self.lines[idx].enabled)
    }

    /// The peripheral bound to `line`, or `None` if never bound.
    pub fn peripheral(&self, line: u8) -> ConfigResult<Option<u8>> {
        let idx = self.check(line)?;
        if self.lines[idx].bound {
            Ok(Some(self.lines[idx].peripheral))
        } else {
            Ok(None)
        }
    }

    /// True when a request arrived on `line` before the previous one was
    /// serviced.
    pub fn overrun(&self, line: u8) -> ConfigResult<bool> {
        let idx = self.check(line)?;
        Ok(self.lines[idx].overrun)
    }

    /// Clear the overrun flag on `line`.
    pub fn clear_overrun(&mut self, line: u8) -> ConfigResult<()> {
        let idx = self.check(line)?;
        self.lines[idx].overrun = false;
        Ok(())
    }

    /// Record an overrun on `line`. Raised by the backend/simulation when
    /// a request collides with an unserviced one.
    pub fn set_overrun(&mut self, line: u8) -> ConfigResult<()> {
        let idx = self.check(line)?;
        self.lines[idx].overrun = true;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
