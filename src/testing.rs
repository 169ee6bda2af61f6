//! Host-test mocks.
//!
//! [`MockBackend`] is a pure latch: it records what the engine asked for
//! and exposes a settable raw event status, with none of the behavioral
//! modeling [`crate::sim::SimBackend`] does. Use it to test the engine's
//! own logic (dispatch ordering, subsumption clearing, state
//! transitions) against arbitrary status patterns.

use embedded_hal::delay::DelayNs;

use crate::driver::config::{ChannelConfig, RequestKind, Side};
use crate::driver::descriptor::GatherScatter;
use crate::driver::error::{ConfigError, ConfigResult};
use crate::driver::list::NodeHandle;
use crate::hal::{DmacBackend, PowerControl, PowerDomain};

// =============================================================================
// Mock Delay
// =============================================================================

/// Delay provider that only counts invocations.
#[derive(Debug, Default)]
pub struct MockDelay {
    delays: u32,
    total_us: u64,
}

impl MockDelay {
    /// A fresh counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of delay calls observed.
    pub fn delays(&self) -> u32 {
        self.delays
    }

    /// Total simulated microseconds slept.
    pub fn total_us(&self) -> u64 {
        self.total_us
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays += 1;
        self.total_us += u64::from(ns) / 1_000;
    }
}

// =============================================================================
// Mock Power Control
// =============================================================================

/// Power collaborator that records domain state and can be made to fail.
#[derive(Debug, Default)]
pub struct MockPower {
    dmac_on: bool,
    fail: bool,
    enables: u32,
}

impl MockPower {
    /// A power controller whose enables succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// A power controller whose enables always fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Number of successful enables.
    pub fn enables(&self) -> u32 {
        self.enables
    }
}

impl PowerControl for MockPower {
    fn enable(&mut self, _domain: PowerDomain) -> ConfigResult<()> {
        if self.fail {
            return Err(ConfigError::PowerError);
        }
        self.dmac_on = true;
        self.enables += 1;
        Ok(())
    }

    fn disable(&mut self, _domain: PowerDomain) -> ConfigResult<()> {
        self.dmac_on = false;
        Ok(())
    }

    fn is_enabled(&self, _domain: PowerDomain) -> bool {
        self.dmac_on
    }
}

// =============================================================================
// Mock Backend
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct MockChannel {
    status: u8,
    started: bool,
    halted: bool,
    suspended: bool,
    source_address: u32,
    destination_address: u32,
    block_size: u16,
    list_head: Option<NodeHandle>,
    source_reload: bool,
    destination_reload: bool,
    triggers: u32,
}

/// Recording backend with settable event status and no behavior.
#[derive(Debug)]
pub struct MockBackend<const CHANNELS: usize> {
    channels: [MockChannel; CHANNELS],
    controller_on: bool,
}

impl<const CHANNELS: usize> Default for MockBackend<CHANNELS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CHANNELS: usize> MockBackend<CHANNELS> {
    /// An idle backend with all-zero status.
    pub fn new() -> Self {
        Self {
            channels: [MockChannel::default(); CHANNELS],
            controller_on: false,
        }
    }

    /// Latch raw status bits on a channel, as hardware would.
    pub fn latch_events(&mut self, channel: usize, mask: u8) {
        self.channels[channel].status |= mask;
    }

    /// True once the engine has started the channel.
    pub fn started(&self, channel: usize) -> bool {
        self.channels[channel].started
    }

    /// True once the engine has halted the channel.
    pub fn halted(&self, channel: usize) -> bool {
        self.channels[channel].halted
    }

    /// Software request triggers observed on the channel.
    pub fn triggers(&self, channel: usize) -> u32 {
        self.channels[channel].triggers
    }
}

impl<const CHANNELS: usize> DmacBackend for MockBackend<CHANNELS> {
    fn controller_enable(&mut self, on: bool) {
        self.controller_on = on;
    }

    fn configure_channel(&mut self, channel: usize, config: &ChannelConfig) {
        let ch = &mut self.channels[channel];
        ch.source_address = config.descriptor.source_address;
        ch.destination_address = config.descriptor.destination_address;
        ch.block_size = config.descriptor.block_size;
        ch.list_head = config.linked_list_head;
        ch.started = false;
        ch.halted = false;
    }

    fn channel_start(&mut self, channel: usize) {
        self.channels[channel].started = true;
        self.channels[channel].halted = false;
    }

    fn channel_halt(&mut self, channel: usize) {
        self.channels[channel].halted = true;
        self.channels[channel].started = false;
    }

    fn channel_is_active(&mut self, _channel: usize) -> bool {
        false
    }

    fn channel_suspend(&mut self, channel: usize, suspend: bool) {
        self.channels[channel].suspended = suspend;
    }

    fn write_source_address(&mut self, channel: usize, address: u32) {
        self.channels[channel].source_address = address;
    }

    fn write_destination_address(&mut self, channel: usize, address: u32) {
        self.channels[channel].destination_address = address;
    }

    fn write_block_size(&mut self, channel: usize, units: u16) {
        self.channels[channel].block_size = units;
    }

    fn write_list_head(&mut self, channel: usize, head: Option<NodeHandle>) {
        self.channels[channel].list_head = head;
    }

    fn set_reload(&mut self, channel: usize, side: Side, enabled: bool) {
        match side {
            Side::Source => self.channels[channel].source_reload = enabled,
            Side::Destination => self.channels[channel].destination_reload = enabled,
        }
    }

    fn set_gather_scatter(
        &mut self,
        _channel: usize,
        _side: Side,
        _params: Option<GatherScatter>,
    ) {
    }

    fn trigger_request(&mut self, channel: usize, _side: Side, _kind: RequestKind, _is_last: bool) {
        self.channels[channel].triggers += 1;
    }

    fn event_status(&mut self, channel: usize) -> u8 {
        self.channels[channel].status
    }

    fn clear_events(&mut self, channel: usize, mask: u8) {
        self.channels[channel].status &= !mask;
    }
}
