//! Behavioral controller model.
//!
//! [`SimBackend`] implements [`DmacBackend`] in plain Rust so the whole
//! driver stack can run on the host. Transfer progress is modeled
//! abstractly, one transaction per [`step`](SimBackend::step); addresses
//! are tracked arithmetically and never dereferenced.
//!
//! The model keeps the controller's observable laws:
//!
//! - strict priority arbitration, ties to the lower channel index;
//! - monotonic per-channel events (transaction, then block, then transfer);
//! - hardware-style status subsumption (a block completion drops the
//!   stale transaction flags, a transfer completion drops everything
//!   narrower);
//! - multi-block continuation per side policy (contiguous advance, reload
//!   snap-back, linked-list walking over a loaded node image);
//! - software-handshake request crediting in transfer units (a `Single`
//!   request releases one unit, a `Burst` request one burst);
//! - gather/scatter address jumps every `count` units on the programmed
//!   side;
//! - a short drain window after a halt before the channel reports idle.

use crate::driver::config::{
    BlockMode, ChannelConfig, Handshake, RequestKind, Side, TransferType,
};
use crate::driver::descriptor::{AddressMode, GatherScatter};
use crate::driver::event::{
    EVENT_BLOCK_COMPLETE, EVENT_DST_TRANSACTION, EVENT_ERROR, EVENT_SRC_TRANSACTION,
    EVENT_TRANSFER_COMPLETE,
};
use crate::driver::list::{ListNode, NodeHandle};
use crate::hal::DmacBackend;

/// Node-image capacity of the model.
pub const MAX_SIM_NODES: usize = 32;

/// Activity polls a halted channel stays busy for while draining.
pub const HALT_DRAIN_POLLS: u8 = 2;

// =============================================================================
// Per-Channel Model State
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct SimChannel {
    active: bool,
    suspended: bool,
    drain: u8,
    priority: u8,
    source_address: u32,
    destination_address: u32,
    programmed_source: u32,
    programmed_destination: u32,
    source_width_bytes: u32,
    destination_width_bytes: u32,
    source_increment: AddressMode,
    destination_increment: AddressMode,
    burst_units: u16,
    block_size: u16,
    remaining: u16,
    source_mode: BlockMode,
    destination_mode: BlockMode,
    multi_block: bool,
    source_reload: bool,
    destination_reload: bool,
    cursor: Option<NodeHandle>,
    needs_source_credit: bool,
    needs_destination_credit: bool,
    source_credits: u16,
    destination_credits: u16,
    finish_after_block: bool,
    source_gather: Option<GatherScatter>,
    destination_scatter: Option<GatherScatter>,
    source_gather_progress: u16,
    destination_scatter_progress: u16,
    blocks_completed: u32,
    status: u8,
}

impl SimChannel {
    const fn new() -> Self {
        Self {
            active: false,
            suspended: false,
            drain: 0,
            priority: 0,
            source_address: 0,
            destination_address: 0,
            programmed_source: 0,
            programmed_destination: 0,
            source_width_bytes: 4,
            destination_width_bytes: 4,
            source_increment: AddressMode::Increment,
            destination_increment: AddressMode::Increment,
            burst_units: 1,
            block_size: 0,
            remaining: 0,
            source_mode: BlockMode::Contiguous,
            destination_mode: BlockMode::Contiguous,
            multi_block: false,
            source_reload: false,
            destination_reload: false,
            cursor: None,
            needs_source_credit: false,
            needs_destination_credit: false,
            source_credits: 0,
            destination_credits: 0,
            finish_after_block: false,
            source_gather: None,
            destination_scatter: None,
            source_gather_progress: 0,
            destination_scatter_progress: 0,
            blocks_completed: 0,
            status: 0,
        }
    }

    fn can_step(&self) -> bool {
        self.active
            && !self.suspended
            && self.remaining > 0
            && (!self.needs_source_credit || self.source_credits > 0)
            && (!self.needs_destination_credit || self.destination_credits > 0)
    }

    fn uses_list(&self) -> bool {
        self.source_mode == BlockMode::LinkedList || self.destination_mode == BlockMode::LinkedList
    }

    fn latch_transaction(&mut self) {
        self.status |= EVENT_SRC_TRANSACTION | EVENT_DST_TRANSACTION;
    }

    fn latch_block(&mut self) {
        self.status |= EVENT_BLOCK_COMPLETE;
        self.status &= !(EVENT_SRC_TRANSACTION | EVENT_DST_TRANSACTION);
    }

    fn latch_transfer(&mut self) {
        self.status |= EVENT_TRANSFER_COMPLETE;
        self.status &=
            !(EVENT_BLOCK_COMPLETE | EVENT_SRC_TRANSACTION | EVENT_DST_TRANSACTION);
        self.active = false;
    }

    fn latch_error(&mut self) {
        self.status |= EVENT_ERROR;
        self.active = false;
    }
}

fn advance(address: u32, mode: AddressMode, units: u32, width_bytes: u32) -> u32 {
    match mode {
        AddressMode::Increment => address.wrapping_add(units * width_bytes),
        AddressMode::Decrement => address.wrapping_sub(units * width_bytes),
        AddressMode::Fixed => address,
    }
}

/// Walk one side's address through `units` units, inserting the
/// gather/scatter jump of `interval` units after every `count` units.
fn advance_side(
    address: &mut u32,
    mode: AddressMode,
    width_bytes: u32,
    units: u16,
    params: Option<GatherScatter>,
    progress: &mut u16,
) {
    let Some(params) = params else {
        *address = advance(*address, mode, u32::from(units), width_bytes);
        return;
    };
    for _ in 0..units {
        *address = advance(*address, mode, 1, width_bytes);
        *progress += 1;
        if *progress == params.count {
            *progress = 0;
            *address = advance(*address, mode, u32::from(params.interval), width_bytes);
        }
    }
}

// =============================================================================
// Simulation Backend
// =============================================================================

/// Host-side controller model.
///
/// # Example
///
/// ```ignore
/// let mut dmac: Dmac<SimBackend<8>, 8, 16> = Dmac::new(SimBackend::new());
/// dmac.enable();
/// dmac.channel(0)?.initialize(&config)?;
/// dmac.channel(0)?.enable()?;
/// dmac.backend_mut().step_until_idle(10_000);
/// let event = dmac.dispatch_interrupt();
/// ```
#[derive(Debug)]
pub struct SimBackend<const CHANNELS: usize> {
    channels: [SimChannel; CHANNELS],
    nodes: [ListNode; MAX_SIM_NODES],
    node_count: usize,
    controller_on: bool,
}

impl<const CHANNELS: usize> Default for SimBackend<CHANNELS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CHANNELS: usize> SimBackend<CHANNELS> {
    /// Create an idle model with an empty node image.
    #[must_use]
    pub const fn new() -> Self {
        const IDLE: SimChannel = SimChannel::new();
        const EMPTY_NODE: ListNode = ListNode {
            descriptor: crate::driver::descriptor::Descriptor::new(0, 0),
            next: None,
        };
        Self {
            channels: [IDLE; CHANNELS],
            nodes: [EMPTY_NODE; MAX_SIM_NODES],
            node_count: 0,
            controller_on: false,
        }
    }

    /// Copy an arena's node slice into the model.
    ///
    /// The image this installs is what linked-list transfers walk; excess
    /// nodes are dropped silently at [`MAX_SIM_NODES`].
    pub fn load_nodes(&mut self, nodes: &[ListNode]) {
        let count = nodes.len().min(MAX_SIM_NODES);
        self.nodes[..count].copy_from_slice(&nodes[..count]);
        self.node_count = count;
    }

    /// Latch a hardware error on `channel`, stopping it.
    pub fn inject_error(&mut self, channel: usize) {
        self.channels[channel].latch_error();
    }

    /// Current source address of `channel`.
    #[must_use]
    pub fn source_address(&self, channel: usize) -> u32 {
        self.channels[channel].source_address
    }

    /// Current destination address of `channel`.
    #[must_use]
    pub fn destination_address(&self, channel: usize) -> u32 {
        self.channels[channel].destination_address
    }

    /// Blocks retired on `channel` since it was last configured.
    #[must_use]
    pub fn blocks_completed(&self, channel: usize) -> u32 {
        self.channels[channel].blocks_completed
    }

    /// Gather/scatter parameters programmed on one side of `channel`.
    #[must_use]
    pub fn gather_scatter(&self, channel: usize, side: Side) -> Option<GatherScatter> {
        match side {
            Side::Source => self.channels[channel].source_gather,
            Side::Destination => self.channels[channel].destination_scatter,
        }
    }

    /// True when no channel can make progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.controller_on || self.channels.iter().all(|c| !c.can_step())
    }

    fn arbitrate(&self) -> Option<usize> {
        if !self.controller_on {
            return None;
        }
        let mut winner: Option<usize> = None;
        for (index, channel) in self.channels.iter().enumerate() {
            if !channel.can_step() {
                continue;
            }
            // Strict priority, ties to the lower index.
            match winner {
                Some(w) if self.channels[w].priority >= channel.priority => {}
                _ => winner = Some(index),
            }
        }
        winner
    }

    fn load_node(&mut self, channel: usize, handle: NodeHandle) -> bool {
        if handle.index() >= self.node_count {
            // Dangling link: the bus fetch faults.
            self.channels[channel].latch_error();
            return false;
        }
        let node = self.nodes[handle.index()];
        let ch = &mut self.channels[channel];
        if ch.source_mode == BlockMode::LinkedList {
            ch.source_address = node.descriptor.source_address;
        }
        if ch.destination_mode == BlockMode::LinkedList {
            ch.destination_address = node.descriptor.destination_address;
        }
        ch.remaining = node.descriptor.block_size;
        ch.cursor = node.next;
        true
    }

    fn finish_block(&mut self, channel: usize) {
        self.channels[channel].blocks_completed += 1;
        self.channels[channel].source_gather_progress = 0;
        self.channels[channel].destination_scatter_progress = 0;

        if !self.channels[channel].multi_block || self.channels[channel].finish_after_block {
            self.channels[channel].latch_transfer();
            return;
        }

        if self.channels[channel].uses_list() {
            match self.channels[channel].cursor {
                Some(next) => {
                    // Reload sides snap back before the next block starts.
                    let ch = &mut self.channels[channel];
                    if ch.source_mode == BlockMode::Reload {
                        ch.source_address = ch.programmed_source;
                    }
                    if ch.destination_mode == BlockMode::Reload {
                        ch.destination_address = ch.programmed_destination;
                    }
                    if self.load_node(channel, next) {
                        self.channels[channel].latch_block();
                    }
                }
                None => self.channels[channel].latch_transfer(),
            }
            return;
        }

        if self.channels[channel].source_reload || self.channels[channel].destination_reload {
            let ch = &mut self.channels[channel];
            if ch.source_reload {
                ch.source_address = ch.programmed_source;
            }
            if ch.destination_reload {
                ch.destination_address = ch.programmed_destination;
            }
            ch.remaining = ch.block_size;
            ch.latch_block();
            return;
        }

        // Both reload flags dropped with no chain left: the block that
        // just retired was the final one.
        self.channels[channel].latch_transfer();
    }

    /// Advance the model by one transaction on the arbitration winner.
    ///
    /// Returns `false` when no channel can make progress.
    pub fn step(&mut self) -> bool {
        let Some(index) = self.arbitrate() else {
            return false;
        };

        let ch = &mut self.channels[index];
        let mut units = ch.remaining.min(ch.burst_units);
        // Credits are granted in transfer units; a lone Single request
        // moves one unit even under a longer burst setting.
        if ch.needs_source_credit {
            units = units.min(ch.source_credits);
        }
        if ch.needs_destination_credit {
            units = units.min(ch.destination_credits);
        }
        ch.remaining -= units;
        advance_side(
            &mut ch.source_address,
            ch.source_increment,
            ch.source_width_bytes,
            units,
            ch.source_gather,
            &mut ch.source_gather_progress,
        );
        advance_side(
            &mut ch.destination_address,
            ch.destination_increment,
            ch.destination_width_bytes,
            units,
            ch.destination_scatter,
            &mut ch.destination_scatter_progress,
        );
        if ch.needs_source_credit {
            ch.source_credits -= units;
        }
        if ch.needs_destination_credit {
            ch.destination_credits -= units;
        }
        ch.latch_transaction();

        if ch.remaining == 0 {
            self.finish_block(index);
        }
        true
    }

    /// Step until nothing can progress or `max_steps` is reached.
    ///
    /// Returns the number of steps taken. A software-paced channel
    /// waiting for a request trigger counts as idle.
    pub fn step_until_idle(&mut self, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps && self.step() {
            steps += 1;
        }
        steps
    }
}

impl<const CHANNELS: usize> DmacBackend for SimBackend<CHANNELS> {
    fn controller_enable(&mut self, on: bool) {
        self.controller_on = on;
        if !on {
            for channel in &mut self.channels {
                channel.active = false;
            }
        }
    }

    fn configure_channel(&mut self, channel: usize, config: &ChannelConfig) {
        let (source_mode, destination_mode, multi_block) = match config.transfer_type {
            TransferType::SingleBlock => (BlockMode::Contiguous, BlockMode::Contiguous, false),
            TransferType::MultiBlock {
                source,
                destination,
            } => (source, destination, true),
        };

        let ch = &mut self.channels[channel];
        *ch = SimChannel {
            priority: config.priority,
            source_address: config.descriptor.source_address,
            destination_address: config.descriptor.destination_address,
            programmed_source: config.descriptor.source_address,
            programmed_destination: config.descriptor.destination_address,
            source_width_bytes: config.descriptor.source_width.bytes(),
            destination_width_bytes: config.descriptor.destination_width.bytes(),
            source_increment: config.descriptor.source_increment,
            destination_increment: config.descriptor.destination_increment,
            burst_units: config.descriptor.source_burst.units(),
            block_size: config.descriptor.block_size,
            remaining: config.descriptor.block_size,
            source_mode,
            destination_mode,
            multi_block,
            source_reload: source_mode == BlockMode::Reload,
            destination_reload: destination_mode == BlockMode::Reload,
            cursor: config.linked_list_head,
            needs_source_credit: config.flow.direction.source_is_peripheral()
                && config.source_handshake == Handshake::Software,
            needs_destination_credit: config.flow.direction.destination_is_peripheral()
                && config.destination_handshake == Handshake::Software,
            source_gather: config.source_gather,
            destination_scatter: config.destination_scatter,
            ..SimChannel::new()
        };
    }

    fn channel_start(&mut self, channel: usize) {
        let uses_list = self.channels[channel].uses_list();
        let head = self.channels[channel].cursor;

        self.channels[channel].active = true;
        self.channels[channel].suspended = false;
        self.channels[channel].drain = 0;
        self.channels[channel].blocks_completed = 0;
        self.channels[channel].source_gather_progress = 0;
        self.channels[channel].destination_scatter_progress = 0;

        // Linked-list transfers fetch their first block from the head
        // node before any data moves.
        if uses_list {
            match head {
                Some(handle) => {
                    self.load_node(channel, handle);
                }
                None => self.channels[channel].latch_error(),
            }
        } else {
            let ch = &mut self.channels[channel];
            ch.remaining = ch.block_size;
        }
    }

    fn channel_halt(&mut self, channel: usize) {
        let ch = &mut self.channels[channel];
        if ch.active {
            ch.drain = HALT_DRAIN_POLLS;
        }
        ch.active = false;
    }

    fn channel_is_active(&mut self, channel: usize) -> bool {
        let ch = &mut self.channels[channel];
        if ch.drain > 0 {
            ch.drain -= 1;
            return true;
        }
        ch.active
    }

    fn channel_suspend(&mut self, channel: usize, suspend: bool) {
        self.channels[channel].suspended = suspend;
    }

    fn write_source_address(&mut self, channel: usize, address: u32) {
        let ch = &mut self.channels[channel];
        ch.programmed_source = address;
        if !ch.active {
            ch.source_address = address;
        }
    }

    fn write_destination_address(&mut self, channel: usize, address: u32) {
        let ch = &mut self.channels[channel];
        ch.programmed_destination = address;
        if !ch.active {
            ch.destination_address = address;
        }
    }

    fn write_block_size(&mut self, channel: usize, units: u16) {
        let ch = &mut self.channels[channel];
        ch.block_size = units;
        if !ch.active {
            ch.remaining = units;
        }
    }

    fn write_list_head(&mut self, channel: usize, head: Option<NodeHandle>) {
        self.channels[channel].cursor = head;
    }

    fn set_reload(&mut self, channel: usize, side: Side, enabled: bool) {
        let ch = &mut self.channels[channel];
        match side {
            Side::Source => ch.source_reload = enabled,
            Side::Destination => ch.destination_reload = enabled,
        }
    }

    fn set_gather_scatter(&mut self, channel: usize, side: Side, params: Option<GatherScatter>) {
        let ch = &mut self.channels[channel];
        match side {
            Side::Source => ch.source_gather = params,
            Side::Destination => ch.destination_scatter = params,
        }
    }

    fn trigger_request(&mut self, channel: usize, side: Side, kind: RequestKind, is_last: bool) {
        let ch = &mut self.channels[channel];
        let units = match kind {
            RequestKind::Single => 1,
            RequestKind::Burst => ch.burst_units,
        };
        match side {
            Side::Source => ch.source_credits += units,
            Side::Destination => ch.destination_credits += units,
        }
        if is_last {
            ch.finish_after_block = true;
        }
    }

    fn event_status(&mut self, channel: usize) -> u8 {
        self.channels[channel].status
    }

    fn clear_events(&mut self, channel: usize, mask: u8) {
        self.channels[channel].status &= !mask;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
