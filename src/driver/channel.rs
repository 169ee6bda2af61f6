//! Per-channel state machine and public channel API.
//!
//! [`Channel`] is the engine's bookkeeping for one channel; clients never
//! hold it directly. The public surface is [`ChannelRef`], a borrowed view
//! obtained from [`Dmac::channel`](crate::driver::engine::Dmac::channel)
//! that couples the bookkeeping with the backend and the request router.
//!
//! State machine:
//!
//! ```text
//! Disabled --initialize--> Configured --enable--> Running --disable--> Disabled
//! Running --suspend--> Suspended --resume--> Running
//! Running --error event--> ErrorLatched --clear_event(Error) + initialize--> Configured
//! Running --final TransferComplete--> Configured
//! ```

use embedded_hal::delay::DelayNs;

use super::config::{
    ChannelConfig, Handshake, RequestKind, Side, GATHER_SCATTER_CHANNELS,
};
use super::descriptor::{Descriptor, GatherScatter, MAX_BLOCK_SIZE};
use super::engine::Dmac;
use super::error::{ChannelError, ChannelResult, ConfigError, Result};
use super::event::{EventSet, EventHandler};
use super::list::NodeHandle;
use crate::hal::DmacBackend;

/// Poll spacing while waiting for a halted channel to drain.
pub const DISABLE_POLL_INTERVAL_US: u32 = 10;

/// Polls before `disable` stops waiting for the drain.
pub const DISABLE_TIMEOUT_POLLS: u32 = 1_000;

// =============================================================================
// Channel State
// =============================================================================

/// Lifecycle state of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    /// Off; must be initialized before use
    #[default]
    Disabled,
    /// Configuration committed, ready to start
    Configured,
    /// Transfer in flight
    Running,
    /// Paused mid-transfer, resumable
    Suspended,
    /// A hardware error latched the channel off
    ErrorLatched,
}

// =============================================================================
// Channel Bookkeeping
// =============================================================================

/// Engine-side record of one channel.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Channel {
    pub(crate) state: ChannelState,
    pub(crate) config: Option<ChannelConfig>,
    pub(crate) event_mask: EventSet,
    pub(crate) handler: Option<EventHandler>,
    pub(crate) source_reload: bool,
    pub(crate) destination_reload: bool,
}

impl Channel {
    pub(crate) const fn new() -> Self {
        Self {
            state: ChannelState::Disabled,
            config: None,
            event_mask: EventSet::empty(),
            handler: None,
            source_reload: false,
            destination_reload: false,
        }
    }
}

// =============================================================================
// Channel Reference
// =============================================================================

/// Borrowed operating view of one channel.
///
/// # Example
///
/// ```ignore
/// let mut ch = dmac.channel(0)?;
/// ch.initialize(&config)?;
/// ch.enable_event(EventSet::only(EventKind::TransferComplete));
/// ch.enable()?;
/// ```
pub struct ChannelRef<'a, B: DmacBackend, const CHANNELS: usize, const LINES: usize> {
    dmac: &'a mut Dmac<B, CHANNELS, LINES>,
    index: usize,
}

impl<'a, B: DmacBackend, const CHANNELS: usize, const LINES: usize>
    ChannelRef<'a, B, CHANNELS, LINES>
{
    pub(crate) fn new(dmac: &'a mut Dmac<B, CHANNELS, LINES>, index: usize) -> Self {
        Self { dmac, index }
    }

    fn book(&self) -> &Channel {
        &self.dmac.channels[self.index]
    }

    fn book_mut(&mut self) -> &mut Channel {
        &mut self.dmac.channels[self.index]
    }

    fn require_engine(&self) -> ChannelResult<()> {
        if self.dmac.enabled {
            Ok(())
        } else {
            Err(ChannelError::EngineDisabled)
        }
    }

    /// A mutator needs a committed configuration that has not been torn
    /// down. Mutating a Running channel is permitted but takes effect at
    /// the next reload point only.
    fn require_mutable(&self) -> ChannelResult<()> {
        match self.book().state {
            ChannelState::Configured | ChannelState::Running | ChannelState::Suspended => Ok(()),
            ChannelState::Disabled | ChannelState::ErrorLatched => {
                Err(ChannelError::NotConfigured)
            }
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Commit a full configuration and move to `Configured`.
    ///
    /// Clears every latched event for the channel so a stale interrupt
    /// cannot fire right after re-configuration, and binds the router
    /// lines named by hardware handshakes.
    ///
    /// # Errors
    ///
    /// `EngineDisabled`, `Busy` (transfer in flight, including Suspended),
    /// and every [`ConfigError`] from [`ChannelConfig::validate`], plus
    /// `Unsupported` for gather/scatter outside the low-index channels.
    pub fn initialize(&mut self, config: &ChannelConfig) -> Result<()> {
        self.require_engine()?;
        match self.book().state {
            ChannelState::Running | ChannelState::Suspended => {
                return Err(ChannelError::Busy.into());
            }
            _ => {}
        }
        config.validate()?;

        if (config.source_gather.is_some() || config.destination_scatter.is_some())
            && self.index >= GATHER_SCATTER_CHANNELS
        {
            return Err(ConfigError::Unsupported.into());
        }

        // Pre-check both lines so a bad second line cannot leave a
        // half-bound router.
        for handshake in [config.source_handshake, config.destination_handshake] {
            if let Some(line) = handshake.request_line()
                && (line.line as usize) >= LINES
            {
                return Err(ConfigError::InvalidRequestLine.into());
            }
        }
        for handshake in [config.source_handshake, config.destination_handshake] {
            if let Some(line) = handshake.request_line() {
                self.dmac.router.enable(line.line, line.peripheral)?;
            }
        }

        self.dmac.backend.configure_channel(self.index, config);
        self.dmac.backend.clear_events(self.index, EventSet::all().to_raw());

        let uses_reload = config.transfer_type.uses_reload();
        let book = self.book_mut();
        book.config = Some(*config);
        book.state = ChannelState::Configured;
        book.source_reload = uses_reload
            && matches!(
                config.transfer_type,
                super::config::TransferType::MultiBlock {
                    source: super::config::BlockMode::Reload,
                    ..
                }
            );
        book.destination_reload = uses_reload
            && matches!(
                config.transfer_type,
                super::config::TransferType::MultiBlock {
                    destination: super::config::BlockMode::Reload,
                    ..
                }
            );
        Ok(())
    }

    /// Start the programmed transfer: `Configured` to `Running`.
    ///
    /// # Errors
    ///
    /// `AlreadyRunning` when the channel is Running or Suspended,
    /// `NotConfigured` from Disabled or ErrorLatched, `EngineDisabled`
    /// when the engine is off.
    pub fn enable(&mut self) -> ChannelResult<()> {
        self.require_engine()?;
        match self.book().state {
            ChannelState::Configured => {}
            ChannelState::Running | ChannelState::Suspended => {
                return Err(ChannelError::AlreadyRunning);
            }
            ChannelState::Disabled | ChannelState::ErrorLatched => {
                return Err(ChannelError::NotConfigured);
            }
        }
        self.dmac.backend.channel_start(self.index);
        self.book_mut().state = ChannelState::Running;
        Ok(())
    }

    /// Force the channel off, aborting any in-flight transfer.
    ///
    /// Always succeeds and is idempotent. This is the one documented
    /// busy-wait in the driver: it polls the backend until the channel
    /// confirms it has stopped, pacing polls with `delay`, and gives up
    /// after [`DISABLE_TIMEOUT_POLLS`]. The channel must be re-initialized
    /// before reuse.
    pub fn disable(&mut self, delay: &mut impl DelayNs) {
        if self.book().state == ChannelState::Disabled {
            return;
        }
        self.dmac.backend.channel_halt(self.index);

        let mut polls = 0;
        while self.dmac.backend.channel_is_active(self.index) {
            if polls >= DISABLE_TIMEOUT_POLLS {
                #[cfg(feature = "log")]
                log::warn!("channel {} still active after disable timeout", self.index);
                break;
            }
            delay.delay_us(DISABLE_POLL_INTERVAL_US);
            polls += 1;
        }

        self.book_mut().state = ChannelState::Disabled;
    }

    /// Pause the transfer without losing state. Idempotent from
    /// `Suspended`.
    ///
    /// # Errors
    ///
    /// `NotRunning` outside Running/Suspended.
    pub fn suspend(&mut self) -> ChannelResult<()> {
        match self.book().state {
            ChannelState::Running => {
                self.dmac.backend.channel_suspend(self.index, true);
                self.book_mut().state = ChannelState::Suspended;
                Ok(())
            }
            ChannelState::Suspended => Ok(()),
            _ => Err(ChannelError::NotRunning),
        }
    }

    /// Continue a suspended transfer. Idempotent from `Running`.
    ///
    /// # Errors
    ///
    /// `NotRunning` outside Running/Suspended.
    pub fn resume(&mut self) -> ChannelResult<()> {
        match self.book().state {
            ChannelState::Suspended => {
                self.dmac.backend.channel_suspend(self.index, false);
                self.book_mut().state = ChannelState::Running;
                Ok(())
            }
            ChannelState::Running => Ok(()),
            _ => Err(ChannelError::NotRunning),
        }
    }

    /// True while the channel is paused.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.book().state == ChannelState::Suspended
    }

    // =========================================================================
    // Live Mutators
    // =========================================================================
    //
    // Usable between transfers (Configured) or, for advanced uses, while
    // Running; a write to a running channel lands at the next reload
    // point, a weaker timing guarantee the caller must understand.

    /// Update the source address.
    pub fn set_source_address(&mut self, address: u32) -> Result<()> {
        self.require_mutable()?;
        let config = self.book().config.as_ref().ok_or(ChannelError::NotConfigured)?;
        if !config.descriptor.source_width.is_aligned(address) {
            return Err(ConfigError::SourceMisaligned.into());
        }
        if let Some(config) = self.book_mut().config.as_mut() {
            config.descriptor.source_address = address;
        }
        self.dmac.backend.write_source_address(self.index, address);
        Ok(())
    }

    /// Update the destination address.
    pub fn set_destination_address(&mut self, address: u32) -> Result<()> {
        self.require_mutable()?;
        let config = self.book().config.as_ref().ok_or(ChannelError::NotConfigured)?;
        if !config.descriptor.destination_width.is_aligned(address) {
            return Err(ConfigError::DestinationMisaligned.into());
        }
        if let Some(config) = self.book_mut().config.as_mut() {
            config.descriptor.destination_address = address;
        }
        self.dmac
            .backend
            .write_destination_address(self.index, address);
        Ok(())
    }

    /// Update the block size in transfer units.
    pub fn set_block_size(&mut self, units: u16) -> Result<()> {
        self.require_mutable()?;
        if units == 0 || units > MAX_BLOCK_SIZE {
            return Err(ConfigError::BlockSizeOutOfRange.into());
        }
        if let Some(config) = self.book_mut().config.as_mut() {
            config.descriptor.block_size = units;
        }
        self.dmac.backend.write_block_size(self.index, units);
        Ok(())
    }

    /// Repoint the linked-list cursor at `head`.
    pub fn set_linked_list_head(&mut self, head: NodeHandle) -> Result<()> {
        self.require_mutable()?;
        if let Some(config) = self.book_mut().config.as_mut() {
            config.linked_list_head = Some(head);
        }
        self.dmac.backend.write_list_head(self.index, Some(head));
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Subscribe the channel to the kinds in `mask`.
    ///
    /// The mask gates only interrupt assertion; status latching is
    /// unconditional.
    pub fn enable_event(&mut self, mask: EventSet) {
        let book = self.book_mut();
        book.event_mask = book.event_mask.union(mask);
    }

    /// Unsubscribe the kinds in `mask`.
    pub fn disable_event(&mut self, mask: EventSet) {
        let book = self.book_mut();
        book.event_mask = book.event_mask.difference(mask);
    }

    /// Drop the latched kinds in `mask`. Consumers clear after handling,
    /// otherwise the interrupt re-fires.
    pub fn clear_event(&mut self, mask: EventSet) {
        self.dmac.backend.clear_events(self.index, mask.to_raw());
    }

    /// The channel's raw latched event status.
    pub fn event_status(&mut self) -> EventSet {
        EventSet::from_raw(self.dmac.backend.event_status(self.index))
    }

    /// Register the completion callback, replacing any previous one.
    pub fn set_event_handler(&mut self, handler: EventHandler) {
        self.book_mut().handler = Some(handler);
    }

    /// Drop the completion callback.
    pub fn clear_event_handler(&mut self) {
        self.book_mut().handler = None;
    }

    // =========================================================================
    // Gather / Scatter
    // =========================================================================

    fn require_gather_scatter(&self) -> Result<()> {
        if self.index >= GATHER_SCATTER_CHANNELS {
            return Err(ConfigError::Unsupported.into());
        }
        self.require_mutable()?;
        Ok(())
    }

    /// Turn on source gather. Low-index channels only; elsewhere this is
    /// an `Unsupported` error, not a silent no-op.
    pub fn enable_source_gather(&mut self, interval: u16, count: u16) -> Result<()> {
        self.require_gather_scatter()?;
        let params = GatherScatter::new(interval, count);
        params.validate()?;
        if let Some(config) = self.book_mut().config.as_mut() {
            config.source_gather = Some(params);
        }
        self.dmac
            .backend
            .set_gather_scatter(self.index, Side::Source, Some(params));
        Ok(())
    }

    /// Turn off source gather.
    pub fn disable_source_gather(&mut self) -> Result<()> {
        self.require_gather_scatter()?;
        if let Some(config) = self.book_mut().config.as_mut() {
            config.source_gather = None;
        }
        self.dmac
            .backend
            .set_gather_scatter(self.index, Side::Source, None);
        Ok(())
    }

    /// Turn on destination scatter. Same channel restriction as gather.
    pub fn enable_destination_scatter(&mut self, interval: u16, count: u16) -> Result<()> {
        self.require_gather_scatter()?;
        let params = GatherScatter::new(interval, count);
        params.validate()?;
        if let Some(config) = self.book_mut().config.as_mut() {
            config.destination_scatter = Some(params);
        }
        self.dmac
            .backend
            .set_gather_scatter(self.index, Side::Destination, Some(params));
        Ok(())
    }

    /// Turn off destination scatter.
    pub fn disable_destination_scatter(&mut self) -> Result<()> {
        self.require_gather_scatter()?;
        if let Some(config) = self.book_mut().config.as_mut() {
            config.destination_scatter = None;
        }
        self.dmac
            .backend
            .set_gather_scatter(self.index, Side::Destination, None);
        Ok(())
    }

    // =========================================================================
    // Reload Control
    // =========================================================================

    /// Auto-reload the source address at every block boundary.
    pub fn enable_source_reload(&mut self) -> ChannelResult<()> {
        self.require_mutable()?;
        self.book_mut().source_reload = true;
        self.dmac.backend.set_reload(self.index, Side::Source, true);
        Ok(())
    }

    /// Stop reloading the source address.
    pub fn disable_source_reload(&mut self) -> ChannelResult<()> {
        self.require_mutable()?;
        self.book_mut().source_reload = false;
        self.dmac.backend.set_reload(self.index, Side::Source, false);
        Ok(())
    }

    /// Auto-reload the destination address at every block boundary.
    pub fn enable_destination_reload(&mut self) -> ChannelResult<()> {
        self.require_mutable()?;
        self.book_mut().destination_reload = true;
        self.dmac
            .backend
            .set_reload(self.index, Side::Destination, true);
        Ok(())
    }

    /// Stop reloading the destination address.
    pub fn disable_destination_reload(&mut self) -> ChannelResult<()> {
        self.require_mutable()?;
        self.book_mut().destination_reload = false;
        self.dmac
            .backend
            .set_reload(self.index, Side::Destination, false);
        Ok(())
    }

    /// Mark the block about to complete as the final one.
    ///
    /// Clears both reload flags so an open-ended reload sequence ends
    /// cleanly with a TransferComplete at the next block boundary.
    /// Intended to be called from the poll context after an event handler
    /// has observed a block completion.
    pub fn request_last_multiblock_transfer(&mut self) -> ChannelResult<()> {
        self.require_mutable()?;
        let book = self.book_mut();
        book.source_reload = false;
        book.destination_reload = false;
        self.dmac.backend.set_reload(self.index, Side::Source, false);
        self.dmac
            .backend
            .set_reload(self.index, Side::Destination, false);
        Ok(())
    }

    // =========================================================================
    // Software Handshake Triggers
    // =========================================================================

    fn trigger_request(
        &mut self,
        side: Side,
        kind: RequestKind,
        is_last: bool,
    ) -> ChannelResult<()> {
        self.require_engine()?;
        let book = self.book();
        if book.state != ChannelState::Running {
            return Err(ChannelError::NotRunning);
        }
        let handshake = match (side, book.config.as_ref()) {
            (_, None) => return Err(ChannelError::NotConfigured),
            (Side::Source, Some(c)) => c.source_handshake,
            (Side::Destination, Some(c)) => c.destination_handshake,
        };
        if handshake != Handshake::Software {
            return Err(ChannelError::WrongHandshakeMode);
        }
        self.dmac
            .backend
            .trigger_request(self.index, side, kind, is_last);
        Ok(())
    }

    /// Pace the source side of a software-handshaked transfer.
    ///
    /// # Errors
    ///
    /// `WrongHandshakeMode` when the source handshake is not Software,
    /// `NotRunning` outside a running transfer.
    pub fn trigger_source_request(&mut self, kind: RequestKind, is_last: bool) -> ChannelResult<()> {
        self.trigger_request(Side::Source, kind, is_last)
    }

    /// Pace the destination side of a software-handshaked transfer.
    pub fn trigger_destination_request(
        &mut self,
        kind: RequestKind,
        is_last: bool,
    ) -> ChannelResult<()> {
        self.trigger_request(Side::Destination, kind, is_last)
    }

    // =========================================================================
    // Readback
    // =========================================================================

    /// The channel index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        self.book().state
    }

    /// Configured priority, when configured.
    #[must_use]
    pub fn priority(&self) -> Option<u8> {
        self.book().config.map(|c| c.priority)
    }

    /// Subscribed event kinds.
    #[must_use]
    pub fn event_mask(&self) -> EventSet {
        self.book().event_mask
    }

    /// Configured source address, when configured.
    #[must_use]
    pub fn source_address(&self) -> Option<u32> {
        self.book().config.map(|c| c.descriptor.source_address)
    }

    /// Configured destination address, when configured.
    #[must_use]
    pub fn destination_address(&self) -> Option<u32> {
        self.book().config.map(|c| c.descriptor.destination_address)
    }

    /// Configured block size, when configured.
    #[must_use]
    pub fn block_size(&self) -> Option<u16> {
        self.book().config.map(|c| c.descriptor.block_size)
    }

    /// Configured descriptor, when configured.
    #[must_use]
    pub fn descriptor(&self) -> Option<Descriptor> {
        self.book().config.map(|c| c.descriptor)
    }

    /// True while source-side auto-reload is armed.
    #[must_use]
    pub fn source_reload(&self) -> bool {
        self.book().source_reload
    }

    /// True while destination-side auto-reload is armed.
    #[must_use]
    pub fn destination_reload(&self) -> bool {
        self.book().destination_reload
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::config::{
        BlockMode, RequestLine, TransferDirection, TransferFlow, TransferType,
    };
    use crate::driver::error::Error;
    use crate::driver::event::EventKind;
    use crate::sim::SimBackend;
    use crate::testing::MockDelay;

    type TestDmac = Dmac<SimBackend<4>, 4, 8>;

    fn dmac() -> TestDmac {
        let mut dmac = Dmac::new(SimBackend::new());
        dmac.enable();
        dmac
    }

    fn config() -> ChannelConfig {
        ChannelConfig::new(
            Descriptor::new(0x2000_0000, 0x2000_8000).with_block_size(16),
        )
    }

    #[test]
    fn initialize_moves_disabled_to_configured() {
        let mut dmac = dmac();
        let mut ch = dmac.channel(0).unwrap();
        assert_eq!(ch.state(), ChannelState::Disabled);
        ch.initialize(&config()).unwrap();
        assert_eq!(ch.state(), ChannelState::Configured);
    }

    #[test]
    fn initialize_requires_engine() {
        let mut dmac: TestDmac = Dmac::new(SimBackend::new());
        let mut ch = dmac.channel(0).unwrap();
        assert_eq!(
            ch.initialize(&config()),
            Err(Error::Channel(ChannelError::EngineDisabled))
        );
    }

    #[test]
    fn initialize_running_channel_is_busy_and_preserves_config() {
        let mut dmac = dmac();
        let mut ch = dmac.channel(0).unwrap();
        ch.initialize(&config()).unwrap();
        ch.enable().unwrap();

        let other = ChannelConfig::new(
            Descriptor::new(0x3000_0000, 0x3000_8000).with_block_size(32),
        );
        assert_eq!(
            ch.initialize(&other),
            Err(Error::Channel(ChannelError::Busy))
        );
        assert_eq!(ch.source_address(), Some(0x2000_0000));
        assert_eq!(ch.block_size(), Some(16));
    }

    #[test]
    fn initialize_suspended_channel_is_busy() {
        let mut dmac = dmac();
        let mut ch = dmac.channel(0).unwrap();
        ch.initialize(&config()).unwrap();
        ch.enable().unwrap();
        ch.suspend().unwrap();
        assert_eq!(
            ch.initialize(&config()),
            Err(Error::Channel(ChannelError::Busy))
        );
    }

    #[test]
    fn enable_transitions_and_rejections() {
        let mut dmac = dmac();
        let mut ch = dmac.channel(0).unwrap();

        assert_eq!(ch.enable(), Err(ChannelError::NotConfigured));

        ch.initialize(&config()).unwrap();
        ch.enable().unwrap();
        assert_eq!(ch.state(), ChannelState::Running);

        assert_eq!(ch.enable(), Err(ChannelError::AlreadyRunning));
    }

    #[test]
    fn config_round_trip() {
        let mut dmac = dmac();
        let mut ch = dmac.channel(0).unwrap();
        ch.initialize(&config()).unwrap();
        assert_eq!(ch.source_address(), Some(0x2000_0000));
        assert_eq!(ch.destination_address(), Some(0x2000_8000));
        assert_eq!(ch.block_size(), Some(16));
        assert_eq!(ch.priority(), Some(0));
    }

    #[test]
    fn disable_is_idempotent() {
        let mut dmac = dmac();
        let mut delay = MockDelay::new();
        let mut ch = dmac.channel(0).unwrap();
        ch.initialize(&config()).unwrap();
        ch.enable().unwrap();

        ch.disable(&mut delay);
        assert_eq!(ch.state(), ChannelState::Disabled);
        ch.disable(&mut delay);
        assert_eq!(ch.state(), ChannelState::Disabled);
    }

    #[test]
    fn disabled_channel_requires_reinitialize() {
        let mut dmac = dmac();
        let mut delay = MockDelay::new();
        let mut ch = dmac.channel(0).unwrap();
        ch.initialize(&config()).unwrap();
        ch.enable().unwrap();
        ch.disable(&mut delay);

        assert_eq!(ch.enable(), Err(ChannelError::NotConfigured));
        ch.initialize(&config()).unwrap();
        ch.enable().unwrap();
        assert_eq!(ch.state(), ChannelState::Running);
    }

    #[test]
    fn suspend_resume_cycle() {
        let mut dmac = dmac();
        let mut ch = dmac.channel(0).unwrap();
        ch.initialize(&config()).unwrap();

        assert_eq!(ch.suspend(), Err(ChannelError::NotRunning));

        ch.enable().unwrap();
        ch.suspend().unwrap();
        assert!(ch.is_suspended());
        ch.suspend().unwrap();

        ch.resume().unwrap();
        assert_eq!(ch.state(), ChannelState::Running);
        ch.resume().unwrap();
    }

    #[test]
    fn mutators_require_configuration() {
        let mut dmac = dmac();
        let mut ch = dmac.channel(0).unwrap();
        assert_eq!(
            ch.set_source_address(0x2000_0000),
            Err(Error::Channel(ChannelError::NotConfigured))
        );
        assert_eq!(
            ch.set_block_size(8),
            Err(Error::Channel(ChannelError::NotConfigured))
        );
    }

    #[test]
    fn mutators_validate_fields() {
        let mut dmac = dmac();
        let mut ch = dmac.channel(0).unwrap();
        ch.initialize(&config()).unwrap();

        assert_eq!(
            ch.set_source_address(0x2000_0002),
            Err(Error::Config(ConfigError::SourceMisaligned))
        );
        assert_eq!(
            ch.set_block_size(0),
            Err(Error::Config(ConfigError::BlockSizeOutOfRange))
        );

        ch.set_source_address(0x2000_0100).unwrap();
        ch.set_block_size(33).unwrap();
        assert_eq!(ch.source_address(), Some(0x2000_0100));
        assert_eq!(ch.block_size(), Some(33));
    }

    #[test]
    fn event_mask_operations() {
        let mut dmac = dmac();
        let mut ch = dmac.channel(0).unwrap();

        ch.enable_event(EventSet::only(EventKind::TransferComplete).with(EventKind::Error));
        assert!(ch.event_mask().contains(EventKind::TransferComplete));
        assert!(ch.event_mask().contains(EventKind::Error));

        ch.disable_event(EventSet::only(EventKind::Error));
        assert!(!ch.event_mask().contains(EventKind::Error));
        assert!(ch.event_mask().contains(EventKind::TransferComplete));
    }

    #[test]
    fn gather_scatter_channel_restriction() {
        let mut dmac = dmac();

        let mut ch = dmac.channel(2).unwrap();
        assert_eq!(
            ch.enable_source_gather(10, 4),
            Err(Error::Config(ConfigError::Unsupported))
        );
        assert_eq!(
            ch.enable_destination_scatter(10, 4),
            Err(Error::Config(ConfigError::Unsupported))
        );

        let mut ch = dmac.channel(0).unwrap();
        ch.initialize(&config()).unwrap();
        ch.enable_source_gather(10, 4).unwrap();
        ch.disable_source_gather().unwrap();
        ch.enable_destination_scatter(8, 2).unwrap();
        ch.disable_destination_scatter().unwrap();
    }

    #[test]
    fn gather_scatter_config_rejected_on_high_channel() {
        let mut dmac = dmac();
        let cfg = config().with_source_gather(GatherScatter::new(10, 4));
        let mut ch = dmac.channel(3).unwrap();
        assert_eq!(
            ch.initialize(&cfg),
            Err(Error::Config(ConfigError::Unsupported))
        );
    }

    #[test]
    fn reload_flags_follow_transfer_type() {
        let mut dmac = dmac();
        let cfg = config().with_transfer_type(TransferType::MultiBlock {
            source: BlockMode::Reload,
            destination: BlockMode::Contiguous,
        });
        let mut ch = dmac.channel(0).unwrap();
        ch.initialize(&cfg).unwrap();
        assert!(ch.source_reload());
        assert!(!ch.destination_reload());
    }

    #[test]
    fn request_last_clears_both_reload_flags() {
        let mut dmac = dmac();
        let cfg = config().with_transfer_type(TransferType::MultiBlock {
            source: BlockMode::Reload,
            destination: BlockMode::Reload,
        });
        let mut ch = dmac.channel(0).unwrap();
        ch.initialize(&cfg).unwrap();
        assert!(ch.source_reload());
        assert!(ch.destination_reload());

        ch.request_last_multiblock_transfer().unwrap();
        assert!(!ch.source_reload());
        assert!(!ch.destination_reload());
    }

    #[test]
    fn reload_toggles() {
        let mut dmac = dmac();
        let mut ch = dmac.channel(0).unwrap();
        ch.initialize(&config()).unwrap();

        ch.enable_source_reload().unwrap();
        assert!(ch.source_reload());
        ch.disable_source_reload().unwrap();
        assert!(!ch.source_reload());

        ch.enable_destination_reload().unwrap();
        assert!(ch.destination_reload());
        ch.disable_destination_reload().unwrap();
        assert!(!ch.destination_reload());
    }

    #[test]
    fn trigger_requires_software_handshake() {
        let mut dmac = dmac();

        let cfg = config()
            .with_flow(TransferFlow::engine_controlled(
                TransferDirection::PeripheralToMemory,
            ))
            .with_source_handshake(Handshake::Hardware(RequestLine {
                line: 1,
                peripheral: 4,
            }));
        let mut ch = dmac.channel(0).unwrap();
        ch.initialize(&cfg).unwrap();
        ch.enable().unwrap();

        assert_eq!(
            ch.trigger_source_request(RequestKind::Single, false),
            Err(ChannelError::WrongHandshakeMode)
        );
        // Destination side is software-paced.
        ch.trigger_destination_request(RequestKind::Burst, false)
            .unwrap();
    }

    #[test]
    fn trigger_requires_running_channel() {
        let mut dmac = dmac();
        let mut ch = dmac.channel(0).unwrap();
        ch.initialize(&config()).unwrap();
        assert_eq!(
            ch.trigger_source_request(RequestKind::Single, false),
            Err(ChannelError::NotRunning)
        );
    }

    #[test]
    fn hardware_handshake_binds_router_line() {
        let mut dmac = dmac();
        let cfg = config()
            .with_flow(TransferFlow::engine_controlled(
                TransferDirection::PeripheralToMemory,
            ))
            .with_source_handshake(Handshake::Hardware(RequestLine {
                line: 3,
                peripheral: 7,
            }));
        dmac.channel(0).unwrap().initialize(&cfg).unwrap();

        assert_eq!(dmac.router().is_enabled(3), Ok(true));
        assert_eq!(dmac.router().peripheral(3), Ok(Some(7)));
    }

    #[test]
    fn disable_does_not_unbind_router_line() {
        let mut dmac = dmac();
        let mut delay = MockDelay::new();
        let cfg = config()
            .with_flow(TransferFlow::engine_controlled(
                TransferDirection::PeripheralToMemory,
            ))
            .with_source_handshake(Handshake::Hardware(RequestLine {
                line: 3,
                peripheral: 7,
            }));
        let mut ch = dmac.channel(0).unwrap();
        ch.initialize(&cfg).unwrap();
        ch.enable().unwrap();
        ch.disable(&mut delay);

        // The router line stays bound and enabled until an explicit
        // router disable.
        assert_eq!(dmac.router().is_enabled(3), Ok(true));
        assert_eq!(dmac.router().peripheral(3), Ok(Some(7)));
        dmac.router_mut().disable(3).unwrap();
        assert_eq!(dmac.router().is_enabled(3), Ok(false));
    }

    #[test]
    fn out_of_range_request_line_rejected() {
        let mut dmac = dmac();
        let cfg = config()
            .with_flow(TransferFlow::engine_controlled(
                TransferDirection::PeripheralToMemory,
            ))
            .with_source_handshake(Handshake::Hardware(RequestLine {
                line: 8,
                peripheral: 1,
            }));
        assert_eq!(
            dmac.channel(0).unwrap().initialize(&cfg),
            Err(Error::Config(ConfigError::InvalidRequestLine))
        );
    }

    #[test]
    fn set_event_handler_replaces_previous() {
        fn handler_a(_channel: u8, _kind: EventKind) {}
        fn handler_b(_channel: u8, _kind: EventKind) {}

        let mut dmac = dmac();
        let mut ch = dmac.channel(0).unwrap();
        ch.set_event_handler(handler_a);
        ch.set_event_handler(handler_b);
        ch.clear_event_handler();
    }
}
