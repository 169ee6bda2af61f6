//! AHB DMA Controller Driver
//!
//! A `no_std`, `no_alloc` Rust driver for a multi-channel,
//! descriptor-driven AHB central DMA controller (DW_ahb_dmac-class IP).
//!
//! # Architecture
//!
//! The driver is organized into three layers:
//!
//! 1. **Engine Layer** ([`driver::engine`]): The [`Dmac`] engine owning the
//!    channel set, the request-line router, and interrupt dispatch
//! 2. **Channel Layer** ([`driver::channel`]): Per-channel state machine and
//!    the [`ChannelRef`] operating API
//! 3. **HAL Layer** ([`hal`]): The [`DmacBackend`](hal::DmacBackend) register
//!    seam and the [`PowerControl`](hal::PowerControl) collaborator
//!
//! [`sim::SimBackend`] is a behavioral model of the controller so the whole
//! stack runs in host tests; nothing in the driver assumes real hardware.
//!
//! # Transfer Model
//!
//! A [`Descriptor`] names the endpoints, widths, bursts, and block size of
//! one block. Multi-block transfers compose a per-side boundary policy
//! (contiguous, reload, or linked-list) via [`TransferType`]; linked-list
//! chains live in a caller-owned [`DescriptorArena`] and are referenced by
//! handle. Peripherals pace transfers by hardware request lines through the
//! [`RequestRouter`], or by software triggers.
//!
//! Completion is event-driven: the controller latches per-channel events
//! (transaction, block, transfer, error) and
//! [`Dmac::dispatch_interrupt`] services them broad-to-narrow, clearing the
//! kinds a broader completion subsumes.
//!
//! # Features
//!
//! - `defmt`: defmt formatting for the public types
//! - `log`: sparse host-side diagnostics at recoverable anomalies
//! - `critical-section`: ISR-safe [`sync::SharedDmac`] wrapper
//!
//! # Example
//!
//! ```ignore
//! use ph_ahb_dmac::{ChannelConfig, Descriptor, Dmac, EventKind, EventSet};
//! use ph_ahb_dmac::sim::SimBackend;
//!
//! let mut dmac: Dmac<SimBackend<8>, 8, 16> = Dmac::new(SimBackend::new());
//! dmac.enable();
//!
//! let config = ChannelConfig::new(
//!     Descriptor::new(0x2000_0000, 0x2000_8000).with_block_size(64),
//! )
//! .with_priority(3);
//!
//! let mut ch = dmac.channel(0)?;
//! ch.initialize(&config)?;
//! ch.enable_event(EventSet::only(EventKind::TransferComplete));
//! ch.enable()?;
//!
//! // interrupt/poll context
//! while let Some(event) = dmac.dispatch_interrupt() {
//!     // event.channel, event.kind
//! }
//! ```

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod sim;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::channel::{ChannelRef, ChannelState};
pub use driver::config::{
    BlockMode, ChannelConfig, FlowController, Handshake, RequestKind, RequestLine, Side,
    TransferDirection, TransferFlow, TransferType, GATHER_SCATTER_CHANNELS, MAX_PRIORITY,
};
pub use driver::descriptor::{
    AddressMode, BurstLen, Descriptor, GatherScatter, TransferWidth, MAX_BLOCK_SIZE,
};
pub use driver::engine::{Dmac, DmacDefault, DmacLarge, DmacSmall};
pub use driver::error::{
    ChannelError, ChannelResult, ConfigError, ConfigResult, Error, Result,
};
pub use driver::event::{DispatchedEvent, EventHandler, EventKind, EventSet};
pub use driver::list::{DescriptorArena, ListNode, NodeHandle};
pub use driver::router::RequestRouter;
