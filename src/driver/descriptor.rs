//! Transfer descriptors.
//!
//! A [`Descriptor`] is pure data: the endpoint addresses, per-side transfer
//! width, burst length, address policy, and the block size. The only
//! behavior is [`Descriptor::validate`], which checks the block-size bound
//! and the address/width alignment rule before anything reaches the
//! backend.

use super::error::{ConfigError, ConfigResult};

/// Largest block size in transfer units the controller accepts.
pub const MAX_BLOCK_SIZE: u16 = 4095;

// =============================================================================
// Per-Side Transfer Parameters
// =============================================================================

/// Transfer width of one unit on one side of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TransferWidth {
    /// 8-bit units
    Bits8 = 1,
    /// 16-bit units
    Bits16 = 2,
    /// 32-bit units (default, full AHB word)
    #[default]
    Bits32 = 4,
}

impl TransferWidth {
    /// Width of one unit in bytes.
    #[must_use]
    pub const fn bytes(self) -> u32 {
        self as u32
    }

    /// True when `address` is aligned for this width.
    #[must_use]
    pub const fn is_aligned(self, address: u32) -> bool {
        address % self.bytes() == 0
    }
}

/// Units moved per bus grant on one side of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BurstLen {
    /// One unit per grant
    #[default]
    Single = 1,
    /// Four units per grant
    Burst4 = 4,
    /// Eight units per grant
    Burst8 = 8,
}

impl BurstLen {
    /// Burst length in transfer units.
    #[must_use]
    pub const fn units(self) -> u16 {
        self as u16
    }
}

/// How an endpoint address moves after each unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressMode {
    /// Advance by one unit width (memory walks forward)
    #[default]
    Increment,
    /// Retreat by one unit width
    Decrement,
    /// Stay fixed (peripheral FIFO register)
    Fixed,
}

// =============================================================================
// Descriptor
// =============================================================================

/// Parameters describing one transfer unit of work (one block).
///
/// Addresses are bus addresses; the driver never dereferences them.
///
/// # Example
///
/// ```ignore
/// let desc = Descriptor::new(0x2000_0000, 0x2000_1000)
///     .with_block_size(64)
///     .with_widths(TransferWidth::Bits32, TransferWidth::Bits32);
/// desc.validate()?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Descriptor {
    /// Source endpoint address
    pub source_address: u32,
    /// Destination endpoint address
    pub destination_address: u32,
    /// Block length in source transfer units
    pub block_size: u16,
    /// Source-side unit width
    pub source_width: TransferWidth,
    /// Destination-side unit width
    pub destination_width: TransferWidth,
    /// Source-side burst length
    pub source_burst: BurstLen,
    /// Destination-side burst length
    pub destination_burst: BurstLen,
    /// Source address policy
    pub source_increment: AddressMode,
    /// Destination address policy
    pub destination_increment: AddressMode,
}

impl Default for Descriptor {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Descriptor {
    /// Create a descriptor moving one 32-bit unit between two addresses.
    #[must_use]
    pub const fn new(source: u32, destination: u32) -> Self {
        Self {
            source_address: source,
            destination_address: destination,
            block_size: 1,
            source_width: TransferWidth::Bits32,
            destination_width: TransferWidth::Bits32,
            source_burst: BurstLen::Single,
            destination_burst: BurstLen::Single,
            source_increment: AddressMode::Increment,
            destination_increment: AddressMode::Increment,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the block size in source transfer units
    #[must_use]
    pub const fn with_block_size(mut self, units: u16) -> Self {
        self.block_size = units;
        self
    }

    /// Set both transfer widths
    #[must_use]
    pub const fn with_widths(mut self, source: TransferWidth, destination: TransferWidth) -> Self {
        self.source_width = source;
        self.destination_width = destination;
        self
    }

    /// Set both burst lengths
    #[must_use]
    pub const fn with_bursts(mut self, source: BurstLen, destination: BurstLen) -> Self {
        self.source_burst = source;
        self.destination_burst = destination;
        self
    }

    /// Set the source address policy
    #[must_use]
    pub const fn with_source_increment(mut self, mode: AddressMode) -> Self {
        self.source_increment = mode;
        self
    }

    /// Set the destination address policy
    #[must_use]
    pub const fn with_destination_increment(mut self, mode: AddressMode) -> Self {
        self.destination_increment = mode;
        self
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check the block-size bound and address/width alignment.
    ///
    /// Returns the first failing field as a [`ConfigError`]; the descriptor
    /// is never silently rounded or masked.
    pub const fn validate(&self) -> ConfigResult<()> {
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::BlockSizeOutOfRange);
        }
        if !self.source_width.is_aligned(self.source_address) {
            return Err(ConfigError::SourceMisaligned);
        }
        if !self.destination_width.is_aligned(self.destination_address) {
            return Err(ConfigError::DestinationMisaligned);
        }
        Ok(())
    }
}

// =============================================================================
// Gather / Scatter
// =============================================================================

/// Periodic address jump inserted within a block.
///
/// After every `count` units the address skips forward by `interval`
/// units, interleaving or de-interleaving data inside one block. Only
/// the lowest-indexed channels implement this; requesting it elsewhere
/// is rejected, not ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GatherScatter {
    /// Units to skip at each boundary
    pub interval: u16,
    /// Units transferred between skips
    pub count: u16,
}

impl GatherScatter {
    /// Create gather/scatter parameters.
    #[must_use]
    pub const fn new(interval: u16, count: u16) -> Self {
        Self { interval, count }
    }

    /// Both fields must be non-zero.
    pub const fn validate(&self) -> ConfigResult<()> {
        if self.interval == 0 || self.count == 0 {
            return Err(ConfigError::InvalidGatherScatter);
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
