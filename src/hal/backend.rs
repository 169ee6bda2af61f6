//! Controller backend trait.

use crate::driver::config::{ChannelConfig, RequestKind, Side};
use crate::driver::descriptor::GatherScatter;
use crate::driver::list::NodeHandle;

/// The register-level operations the engine needs from a controller.
///
/// Channel indices are trusted; the engine bounds-checks before calling
/// down. Event status is a per-channel latch of the raw bits in
/// [`crate::driver::event`], with write-1-to-clear semantics in
/// [`clear_events`](DmacBackend::clear_events).
pub trait DmacBackend {
    /// Turn the whole controller on or off. Off aborts every channel.
    fn controller_enable(&mut self, on: bool);

    /// Commit a validated configuration to a channel's registers.
    fn configure_channel(&mut self, channel: usize, config: &ChannelConfig);

    /// Start the transfer programmed on `channel`.
    fn channel_start(&mut self, channel: usize);

    /// Force `channel` off. The channel may drain in-flight data for a
    /// short time afterwards; poll [`channel_is_active`](DmacBackend::channel_is_active).
    fn channel_halt(&mut self, channel: usize);

    /// True while `channel` still owns the bus after a halt or during a
    /// transfer.
    fn channel_is_active(&mut self, channel: usize) -> bool;

    /// Pause or continue `channel` without losing transfer state.
    fn channel_suspend(&mut self, channel: usize, suspend: bool);

    /// Live source-address update; takes effect at the next reload point
    /// when the channel is running.
    fn write_source_address(&mut self, channel: usize, address: u32);

    /// Live destination-address update; same timing as the source write.
    fn write_destination_address(&mut self, channel: usize, address: u32);

    /// Live block-size update in transfer units.
    fn write_block_size(&mut self, channel: usize, units: u16);

    /// Repoint the linked-list cursor.
    fn write_list_head(&mut self, channel: usize, head: Option<NodeHandle>);

    /// Toggle address auto-reload at block boundaries on one side.
    fn set_reload(&mut self, channel: usize, side: Side, enabled: bool);

    /// Update gather (source) or scatter (destination) parameters.
    fn set_gather_scatter(&mut self, channel: usize, side: Side, params: Option<GatherScatter>);

    /// Software-handshake request trigger on one side.
    fn trigger_request(&mut self, channel: usize, side: Side, kind: RequestKind, is_last: bool);

    /// Raw latched event bits for `channel`.
    fn event_status(&mut self, channel: usize) -> u8;

    /// Write-1-to-clear: drop the `mask` bits from the channel's latch.
    fn clear_events(&mut self, channel: usize, mask: u8);
}
