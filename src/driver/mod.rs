//! Core driver components for the AHB DMA controller.
//!
//! The essential building blocks for configuring and operating the
//! controller:
//!
//! - [`config`] - Channel configuration types and builder patterns
//! - [`descriptor`] - Transfer descriptors and gather/scatter parameters
//! - [`list`] - Linked-list node arena for chained transfers
//! - [`router`] - Request-line router shared by all channels
//! - [`channel`] - Per-channel state machine and operating API
//! - [`engine`] - The engine: channel set, dispatch, global enable
//! - [`event`] - Event kinds, status sets, dispatch results
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```ignore
//! use ph_ahb_dmac::driver::{ChannelConfig, Descriptor, Dmac};
//!
//! let config = ChannelConfig::new(Descriptor::new(src, dst).with_block_size(64))
//!     .with_priority(3);
//! ```

// Submodules
pub mod channel;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod event;
pub mod list;
pub mod router;

// Re-exports for convenience
pub use channel::{
    ChannelRef, ChannelState, DISABLE_POLL_INTERVAL_US, DISABLE_TIMEOUT_POLLS,
};
pub use config::{
    BlockMode, ChannelConfig, FlowController, Handshake, RequestKind, RequestLine, Side,
    TransferDirection, TransferFlow, TransferType, GATHER_SCATTER_CHANNELS, MAX_PRIORITY,
};
pub use descriptor::{
    AddressMode, BurstLen, Descriptor, GatherScatter, TransferWidth, MAX_BLOCK_SIZE,
};
pub use engine::{Dmac, DmacDefault, DmacLarge, DmacSmall};
pub use error::{
    ChannelError, ChannelResult, ConfigError, ConfigResult, Error, Result,
};
pub use event::{DispatchedEvent, EventHandler, EventKind, EventSet};
pub use list::{DescriptorArena, ListNode, NodeHandle};
pub use router::RequestRouter;
