//! Controller engine: channel set, global enable, event dispatch.
//!
//! [`Dmac`] owns the backend, the channel bookkeeping, and the request
//! router. It is passive: transfer progress happens in the backend
//! (hardware, or [`crate::sim::SimBackend`] on the host) concurrently
//! with the calling thread, and the engine's only execution is the
//! synchronous configuration calls plus [`Dmac::dispatch_interrupt`],
//! driven from an interrupt or polling context.

use super::channel::{Channel, ChannelRef, ChannelState};
use super::error::{ConfigError, ConfigResult};
use super::event::{
    DispatchedEvent, EventKind, EventSet, EVENT_BLOCK_COMPLETE, EVENT_DST_TRANSACTION,
    EVENT_ERROR, EVENT_SRC_TRANSACTION, EVENT_TRANSFER_COMPLETE,
};
use super::router::RequestRouter;
use crate::hal::{DmacBackend, PowerControl, PowerDomain};

/// Dispatch decision table, broad-to-narrow.
///
/// A later, broader completion subsumes the earlier narrower ones, so each
/// row clears the narrower flags alongside its own; servicing in this
/// order prevents a spurious second dispatch for an event that is already
/// implied handled.
const DISPATCH_TABLE: [(EventKind, u8); 5] = [
    (EventKind::Error, EVENT_ERROR),
    (
        EventKind::TransferComplete,
        EVENT_TRANSFER_COMPLETE
            | EVENT_BLOCK_COMPLETE
            | EVENT_SRC_TRANSACTION
            | EVENT_DST_TRANSACTION,
    ),
    (
        EventKind::BlockComplete,
        EVENT_BLOCK_COMPLETE | EVENT_SRC_TRANSACTION | EVENT_DST_TRANSACTION,
    ),
    (EventKind::SourceTransactionComplete, EVENT_SRC_TRANSACTION),
    (EventKind::DestinationTransactionComplete, EVENT_DST_TRANSACTION),
];

// =============================================================================
// Engine
// =============================================================================

/// The DMA controller engine.
///
/// `CHANNELS` is the channel count, `LINES` the request-line count; both
/// are fixed at the type level like the rest of the family.
///
/// # Example
///
/// ```ignore
/// let mut dmac: DmacDefault<SimBackend<8>> = Dmac::new(SimBackend::new());
/// dmac.enable();
/// let mut ch = dmac.channel(0)?;
/// ch.initialize(&config)?;
/// ch.enable()?;
/// ```
pub struct Dmac<B: DmacBackend, const CHANNELS: usize, const LINES: usize> {
    pub(crate) backend: B,
    pub(crate) channels: [Channel; CHANNELS],
    pub(crate) router: RequestRouter<LINES>,
    pub(crate) enabled: bool,
}

impl<B: DmacBackend, const CHANNELS: usize, const LINES: usize> Dmac<B, CHANNELS, LINES> {
    /// Create a disabled engine over `backend`.
    pub const fn new(backend: B) -> Self {
        const IDLE: Channel = Channel::new();
        Self {
            backend,
            channels: [IDLE; CHANNELS],
            router: RequestRouter::new(),
            enabled: false,
        }
    }

    /// Number of channels.
    #[must_use]
    pub const fn channel_count(&self) -> usize {
        CHANNELS
    }

    // =========================================================================
    // Global Enable
    // =========================================================================

    /// Turn the controller on. All channel operations require this.
    pub fn enable(&mut self) {
        self.backend.controller_enable(true);
        self.enabled = true;
    }

    /// Turn the controller off, aborting every channel.
    ///
    /// Channels drop to `Disabled` and must be re-initialized after the
    /// engine comes back up.
    pub fn disable(&mut self) {
        for index in 0..CHANNELS {
            if matches!(
                self.channels[index].state,
                ChannelState::Running | ChannelState::Suspended
            ) {
                self.backend.channel_halt(index);
            }
            self.channels[index].state = ChannelState::Disabled;
        }
        self.backend.controller_enable(false);
        self.enabled = false;
    }

    /// True while the controller is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Bring up the controller's power domain, then the controller.
    ///
    /// # Errors
    ///
    /// [`ConfigError::PowerError`] when the domain enable fails; the
    /// controller is left off in that case.
    pub fn enable_with_power<P: PowerControl>(&mut self, power: &mut P) -> ConfigResult<()> {
        power.enable(PowerDomain::Dmac)?;
        self.enable();
        Ok(())
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Borrow the operating view of one channel.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidChannel`] for an index outside the channel
    /// array.
    pub fn channel(&mut self, index: usize) -> ConfigResult<ChannelRef<'_, B, CHANNELS, LINES>> {
        if index < CHANNELS {
            Ok(ChannelRef::new(self, index))
        } else {
            Err(ConfigError::InvalidChannel)
        }
    }

    /// The shared request-line router.
    #[must_use]
    pub fn router(&self) -> &RequestRouter<LINES> {
        &self.router
    }

    /// Mutable access to the request-line router.
    pub fn router_mut(&mut self) -> &mut RequestRouter<LINES> {
        &mut self.router
    }

    /// The backend, for inspection.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// OR of every channel's raw event status.
    ///
    /// Cheap "any work to do" check ahead of the per-channel scan in
    /// [`dispatch_interrupt`](Self::dispatch_interrupt); ignores the
    /// per-channel event masks.
    pub fn global_event_status(&mut self) -> EventSet {
        let mut raw = 0u8;
        for index in 0..CHANNELS {
            raw |= self.backend.event_status(index);
        }
        EventSet::from_raw(raw)
    }

    /// True when any channel has a latched event its mask subscribes to,
    /// i.e. whether the IRQ line should be asserted.
    pub fn interrupt_pending(&mut self) -> bool {
        for index in 0..CHANNELS {
            let raw = EventSet::from_raw(self.backend.event_status(index));
            if !raw.intersect(self.channels[index].event_mask).is_empty() {
                return true;
            }
        }
        false
    }

    /// Service one event: the single entry point for the interrupt/poll
    /// layer.
    ///
    /// Picks the broadest pending kind (Error first, then
    /// TransferComplete, BlockComplete, the transaction kinds), scans
    /// channels in index order for the first one asserting it, clears
    /// that channel's flag together with the kinds it subsumes, applies
    /// the state transition, and invokes the channel's handler if one is
    /// registered. One event per call; errors in particular are serviced
    /// one channel at a time. The event is cleared even when no handler
    /// is registered, so an unconsumed event cannot become an interrupt
    /// storm.
    pub fn dispatch_interrupt(&mut self) -> Option<DispatchedEvent> {
        let global = self.global_event_status();
        if global.is_empty() {
            return None;
        }

        for (kind, clear_mask) in DISPATCH_TABLE {
            if !global.contains(kind) {
                continue;
            }
            for index in 0..CHANNELS {
                if self.backend.event_status(index) & kind.bit() == 0 {
                    continue;
                }
                self.backend.clear_events(index, clear_mask);

                match kind {
                    EventKind::Error => {
                        #[cfg(feature = "log")]
                        log::warn!("hardware error latched on channel {index}");
                        if matches!(
                            self.channels[index].state,
                            ChannelState::Running | ChannelState::Suspended
                        ) {
                            self.channels[index].state = ChannelState::ErrorLatched;
                        }
                    }
                    EventKind::TransferComplete => {
                        // The backend raises TransferComplete only when the
                        // transfer retires, so the channel auto-stops here.
                        if matches!(
                            self.channels[index].state,
                            ChannelState::Running | ChannelState::Suspended
                        ) {
                            self.channels[index].state = ChannelState::Configured;
                        }
                    }
                    _ => {}
                }

                if let Some(handler) = self.channels[index].handler {
                    handler(index as u8, kind);
                }
                return Some(DispatchedEvent {
                    channel: index as u8,
                    kind,
                });
            }
            return None;
        }
        None
    }
}

// =============================================================================
// Family Aliases
// =============================================================================

/// Standard configuration: 8 channels, 16 request lines.
pub type DmacDefault<B> = Dmac<B, 8, 16>;

/// Reduced configuration for small family members: 4 channels, 8 lines.
pub type DmacSmall<B> = Dmac<B, 4, 8>;

/// Large configuration: 16 channels, 32 lines.
pub type DmacLarge<B> = Dmac<B, 16, 32>;

// =============================================================================
// Unit Tests
// =============================================================================
