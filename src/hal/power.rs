//! Power-domain collaborator.
//!
//! The controller's power domain must be up before the engine is enabled.
//! The engine does not manage power itself; [`crate::driver::engine::Dmac::enable_with_power`]
//! merely sequences the domain enable ahead of the controller enable.

use crate::driver::error::{ConfigError, ConfigResult};

/// Power domains the driver knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerDomain {
    /// The DMA controller block
    Dmac,
}

/// Minimal power-management interface.
pub trait PowerControl {
    /// Bring `domain` up.
    ///
    /// # Errors
    ///
    /// Reports [`ConfigError::PowerError`] when the domain cannot be
    /// enabled.
    fn enable(&mut self, domain: PowerDomain) -> ConfigResult<()>;

    /// Take `domain` down.
    fn disable(&mut self, domain: PowerDomain) -> ConfigResult<()>;

    /// True while `domain` is up.
    fn is_enabled(&self, domain: PowerDomain) -> bool;
}

/// Power control for targets where the domain is always on.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOn;

impl PowerControl for AlwaysOn {
    fn enable(&mut self, _domain: PowerDomain) -> ConfigResult<()> {
        Ok(())
    }

    fn disable(&mut self, _domain: PowerDomain) -> ConfigResult<()> {
        Err(ConfigError::PowerError)
    }

    fn is_enabled(&self, _domain: PowerDomain) -> bool {
        true
    }
}
