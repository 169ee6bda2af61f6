//! Channel configuration types.
//!
//! [`ChannelConfig`] gathers everything a channel needs before it is armed:
//! the block descriptor, priority, flow shape, per-side handshaking, the
//! multi-block policy pair, and the optional gather/scatter parameters.
//! Validation is front-loaded in [`ChannelConfig::validate`] so the engine
//! only ever commits self-consistent configurations to the backend.

use super::descriptor::{Descriptor, GatherScatter};
use super::error::{ConfigError, ConfigResult};
use super::list::NodeHandle;

/// Highest channel priority level.
pub const MAX_PRIORITY: u8 = 7;

/// Channels `0..GATHER_SCATTER_CHANNELS` implement source gather and
/// destination scatter; the rest reject those options.
pub const GATHER_SCATTER_CHANNELS: usize = 2;

// =============================================================================
// Transfer Flow
// =============================================================================

/// Which side of the transfer is memory and which is a peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferDirection {
    /// Memory to memory
    #[default]
    MemoryToMemory,
    /// Memory to peripheral
    MemoryToPeripheral,
    /// Peripheral to memory
    PeripheralToMemory,
    /// Peripheral to peripheral
    PeripheralToPeripheral,
}

impl TransferDirection {
    /// True when the source side is a peripheral.
    #[must_use]
    pub const fn source_is_peripheral(self) -> bool {
        matches!(
            self,
            TransferDirection::PeripheralToMemory | TransferDirection::PeripheralToPeripheral
        )
    }

    /// True when the destination side is a peripheral.
    #[must_use]
    pub const fn destination_is_peripheral(self) -> bool {
        matches!(
            self,
            TransferDirection::MemoryToPeripheral | TransferDirection::PeripheralToPeripheral
        )
    }
}

/// Which party decides when the block ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowController {
    /// The engine counts down `block_size`
    #[default]
    Engine,
    /// The source peripheral signals the end of the block
    SourcePeripheral,
    /// The destination peripheral signals the end of the block
    DestinationPeripheral,
}

/// Direction plus flow-controller choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferFlow {
    /// Endpoint roles
    pub direction: TransferDirection,
    /// Who terminates each block
    pub controller: FlowController,
}

impl TransferFlow {
    /// Engine-controlled memory-to-memory flow.
    #[must_use]
    pub const fn memory_to_memory() -> Self {
        Self {
            direction: TransferDirection::MemoryToMemory,
            controller: FlowController::Engine,
        }
    }

    /// Engine-controlled flow in the given direction.
    #[must_use]
    pub const fn engine_controlled(direction: TransferDirection) -> Self {
        Self {
            direction,
            controller: FlowController::Engine,
        }
    }

    /// A peripheral flow controller must actually be a peripheral.
    pub const fn validate(&self) -> ConfigResult<()> {
        match self.controller {
            FlowController::Engine => Ok(()),
            FlowController::SourcePeripheral => {
                if self.direction.source_is_peripheral() {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidHandshake)
                }
            }
            FlowController::DestinationPeripheral => {
                if self.direction.destination_is_peripheral() {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidHandshake)
                }
            }
        }
    }
}

// =============================================================================
// Handshaking
// =============================================================================

/// A router line bound to a peripheral request source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RequestLine {
    /// Router line index
    pub line: u8,
    /// Peripheral request-source identifier carried on that line
    pub peripheral: u8,
}

/// How one side of the channel is paced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Handshake {
    /// Software pacing via explicit request triggers
    #[default]
    Software,
    /// Hardware pacing through a router request line
    Hardware(RequestLine),
}

impl Handshake {
    /// The request line, when hardware-paced.
    #[must_use]
    pub const fn request_line(self) -> Option<RequestLine> {
        match self {
            Handshake::Software => None,
            Handshake::Hardware(line) => Some(line),
        }
    }
}

/// Granularity of a software-paced request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestKind {
    /// One transfer unit
    #[default]
    Single,
    /// One burst of units
    Burst,
}

/// Source or destination side of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Side {
    /// Source endpoint
    Source,
    /// Destination endpoint
    Destination,
}

// =============================================================================
// Multi-Block Policy
// =============================================================================

/// What one side does at each block boundary of a multi-block transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlockMode {
    /// Address continues from where the previous block ended
    #[default]
    Contiguous,
    /// Address snaps back to its programmed start for every block
    Reload,
    /// Address comes from the next linked-list node
    LinkedList,
}

/// Single-block, or one of the supported multi-block policy pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferType {
    /// One block, then transfer complete
    #[default]
    SingleBlock,
    /// Multiple blocks with independent per-side boundary policies
    MultiBlock {
        /// Source-side boundary policy
        source: BlockMode,
        /// Destination-side boundary policy
        destination: BlockMode,
    },
}

impl TransferType {
    /// Reject the one unsupported pair.
    ///
    /// Contiguous on both sides never ends; that workload is a larger
    /// single block.
    pub const fn validate(&self) -> ConfigResult<()> {
        match self {
            TransferType::MultiBlock {
                source: BlockMode::Contiguous,
                destination: BlockMode::Contiguous,
            } => Err(ConfigError::InvalidTransferType),
            _ => Ok(()),
        }
    }

    /// True when either side walks a linked list.
    #[must_use]
    pub const fn uses_linked_list(&self) -> bool {
        matches!(
            self,
            TransferType::MultiBlock {
                source: BlockMode::LinkedList,
                ..
            } | TransferType::MultiBlock {
                destination: BlockMode::LinkedList,
                ..
            }
        )
    }

    /// True when either side reloads its start address.
    #[must_use]
    pub const fn uses_reload(&self) -> bool {
        matches!(
            self,
            TransferType::MultiBlock {
                source: BlockMode::Reload,
                ..
            } | TransferType::MultiBlock {
                destination: BlockMode::Reload,
                ..
            }
        )
    }
}

// =============================================================================
// Channel Configuration
// =============================================================================

/// Complete arm-time configuration of one channel.
///
/// # Example
///
/// ```ignore
/// let config = ChannelConfig::new(descriptor)
///     .with_priority(5)
///     .with_flow(TransferFlow::engine_controlled(TransferDirection::PeripheralToMemory))
///     .with_source_handshake(Handshake::Hardware(RequestLine { line: 3, peripheral: 11 }));
/// channel.initialize(&config)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// First (or only) block descriptor
    pub descriptor: Descriptor,
    /// Arbitration priority, `0..=MAX_PRIORITY`, higher wins
    pub priority: u8,
    /// Direction and flow controller
    pub flow: TransferFlow,
    /// Source-side pacing
    pub source_handshake: Handshake,
    /// Destination-side pacing
    pub destination_handshake: Handshake,
    /// Single- or multi-block policy
    pub transfer_type: TransferType,
    /// Chain head, required exactly when a side uses `BlockMode::LinkedList`
    pub linked_list_head: Option<NodeHandle>,
    /// Source gather parameters, low-index channels only
    pub source_gather: Option<GatherScatter>,
    /// Destination scatter parameters, low-index channels only
    pub destination_scatter: Option<GatherScatter>,
}

impl ChannelConfig {
    /// Single-block, priority-0, software-paced, memory-to-memory defaults.
    #[must_use]
    pub const fn new(descriptor: Descriptor) -> Self {
        Self {
            descriptor,
            priority: 0,
            flow: TransferFlow::memory_to_memory(),
            source_handshake: Handshake::Software,
            destination_handshake: Handshake::Software,
            transfer_type: TransferType::SingleBlock,
            linked_list_head: None,
            source_gather: None,
            destination_scatter: None,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the arbitration priority
    #[must_use]
    pub const fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Set the transfer flow
    #[must_use]
    pub const fn with_flow(mut self, flow: TransferFlow) -> Self {
        self.flow = flow;
        self
    }

    /// Set the source-side handshake
    #[must_use]
    pub const fn with_source_handshake(mut self, handshake: Handshake) -> Self {
        self.source_handshake = handshake;
        self
    }

    /// Set the destination-side handshake
    #[must_use]
    pub const fn with_destination_handshake(mut self, handshake: Handshake) -> Self {
        self.destination_handshake = handshake;
        self
    }

    /// Set the transfer type
    #[must_use]
    pub const fn with_transfer_type(mut self, transfer_type: TransferType) -> Self {
        self.transfer_type = transfer_type;
        self
    }

    /// Set the linked-list chain head
    #[must_use]
    pub const fn with_linked_list_head(mut self, head: NodeHandle) -> Self {
        self.linked_list_head = Some(head);
        self
    }

    /// Set source gather parameters
    #[must_use]
    pub const fn with_source_gather(mut self, gather: GatherScatter) -> Self {
        self.source_gather = Some(gather);
        self
    }

    /// Set destination scatter parameters
    #[must_use]
    pub const fn with_destination_scatter(mut self, scatter: GatherScatter) -> Self {
        self.destination_scatter = Some(scatter);
        self
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Cross-field validation, first failure wins.
    ///
    /// Checks, in order: the descriptor, the priority bound, the flow
    /// shape, the transfer-type pair, hardware handshakes against the
    /// endpoint roles, linked-list head presence against the policy, and
    /// the gather/scatter parameters.
    pub const fn validate(&self) -> ConfigResult<()> {
        if let Err(e) = self.descriptor.validate() {
            return Err(e);
        }
        if self.priority > MAX_PRIORITY {
            return Err(ConfigError::PriorityOutOfRange);
        }
        if let Err(e) = self.flow.validate() {
            return Err(e);
        }
        if let Err(e) = self.transfer_type.validate() {
            return Err(e);
        }

        // Hardware pacing only makes sense on a peripheral endpoint.
        if matches!(self.source_handshake, Handshake::Hardware(_))
            && !self.flow.direction.source_is_peripheral()
        {
            return Err(ConfigError::InvalidHandshake);
        }
        if matches!(self.destination_handshake, Handshake::Hardware(_))
            && !self.flow.direction.destination_is_peripheral()
        {
            return Err(ConfigError::InvalidHandshake);
        }

        if self.transfer_type.uses_linked_list() != self.linked_list_head.is_some() {
            return Err(ConfigError::InvalidChain);
        }

        if let Some(gather) = self.source_gather
            && let Err(e) = gather.validate()
        {
            return Err(e);
        }
        if let Some(scatter) = self.destination_scatter
            && let Err(e) = scatter.validate()
        {
            return Err(e);
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
