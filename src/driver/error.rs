//! Error types for the DMA controller driver
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Descriptor and channel configuration failures
//! - [`ChannelError`]: Channel state machine violations
//!
//! The unified [`Error`] enum wraps both domain errors and is returned
//! by most driver methods.
//!
//! Hardware faults (bus errors) are deliberately *not* part of this
//! taxonomy: they occur after the triggering call has returned and are
//! surfaced exclusively through the [`Error`](crate::EventKind::Error)
//! event.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Descriptor and channel configuration errors
///
/// These errors are raised synchronously from `initialize` and the
/// configuration mutators, before anything is committed to hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Block size is zero or exceeds the hardware maximum
    BlockSizeOutOfRange,
    /// Source address is not aligned to the source transfer width
    SourceMisaligned,
    /// Destination address is not aligned to the destination transfer width
    DestinationMisaligned,
    /// Priority exceeds the highest supported level
    PriorityOutOfRange,
    /// Multi-block policy combination not supported by the hardware
    InvalidTransferType,
    /// Hardware handshake requested on a side that is not a peripheral
    InvalidHandshake,
    /// Gather/scatter requested on a channel without that feature
    Unsupported,
    /// Channel index outside the controller's channel array
    InvalidChannel,
    /// Request line index outside the router's line array
    InvalidRequestLine,
    /// Linked-list chain is missing, cyclic, or refers outside its arena
    InvalidChain,
    /// Gather/scatter interval or count is zero
    InvalidGatherScatter,
    /// Power domain could not be enabled
    PowerError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::BlockSizeOutOfRange => "block size out of range",
            ConfigError::SourceMisaligned => "source address misaligned for width",
            ConfigError::DestinationMisaligned => "destination address misaligned for width",
            ConfigError::PriorityOutOfRange => "priority out of range",
            ConfigError::InvalidTransferType => "unsupported multi-block combination",
            ConfigError::InvalidHandshake => "handshake mode invalid for flow",
            ConfigError::Unsupported => "feature not supported on this channel",
            ConfigError::InvalidChannel => "channel index out of range",
            ConfigError::InvalidRequestLine => "request line index out of range",
            ConfigError::InvalidChain => "invalid linked-list chain",
            ConfigError::InvalidGatherScatter => "invalid gather/scatter parameters",
            ConfigError::PowerError => "power domain enable failed",
        }
    }
}

// =============================================================================
// Channel Errors
// =============================================================================

/// Channel state machine errors
///
/// These errors relate to operations attempted in the wrong channel or
/// engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelError {
    /// Attempt to reconfigure a channel with a transfer in flight
    Busy,
    /// Attempt to operate while the engine is disabled
    EngineDisabled,
    /// `enable()` called on a channel that is already running
    AlreadyRunning,
    /// Operation requires a configured channel
    NotConfigured,
    /// Operation requires a running (or suspended) channel
    NotRunning,
    /// Request trigger on a side whose handshake is not software-paced
    WrongHandshakeMode,
}

impl core::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ChannelError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ChannelError::Busy => "channel busy",
            ChannelError::EngineDisabled => "engine disabled",
            ChannelError::AlreadyRunning => "channel already running",
            ChannelError::NotConfigured => "channel not configured",
            ChannelError::NotRunning => "channel not running",
            ChannelError::WrongHandshakeMode => "handshake is not software-paced",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps both domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::SourceMisaligned)) => { /* ... */ }
///     Err(Error::Channel(ChannelError::Busy)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// Channel state error
    Channel(ChannelError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Channel(e) => write!(f, "channel: {}", e.as_str()),
        }
    }
}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<ChannelError> for Error {
    fn from(e: ChannelError) -> Self {
        Error::Channel(e)
    }
}

/// Result type alias for DMA controller operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for channel state operations
pub type ChannelResult<T> = core::result::Result<T, ChannelError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    // =========================================================================
    // ConfigError Tests
    // =========================================================================

    #[test]
    fn config_error_as_str_non_empty() {
        let variants = [
            ConfigError::BlockSizeOutOfRange,
            ConfigError::SourceMisaligned,
            ConfigError::DestinationMisaligned,
            ConfigError::PriorityOutOfRange,
            ConfigError::InvalidTransferType,
            ConfigError::InvalidHandshake,
            ConfigError::Unsupported,
            ConfigError::InvalidChannel,
            ConfigError::InvalidRequestLine,
            ConfigError::InvalidChain,
            ConfigError::InvalidGatherScatter,
            ConfigError::PowerError,
        ];

        for variant in variants {
            let s = variant.as_str();
            assert!(!s.is_empty(), "ConfigError::{:?} has empty string", variant);
        }
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::SourceMisaligned;
        let display = format!("{}", err);
        assert_eq!(display, "source address misaligned for width");
    }

    #[test]
    fn config_error_equality() {
        assert_eq!(ConfigError::Unsupported, ConfigError::Unsupported);
        assert_ne!(ConfigError::Unsupported, ConfigError::InvalidChain);
    }

    // =========================================================================
    // ChannelError Tests
    // =========================================================================

    #[test]
    fn channel_error_as_str_non_empty() {
        let variants = [
            ChannelError::Busy,
            ChannelError::EngineDisabled,
            ChannelError::AlreadyRunning,
            ChannelError::NotConfigured,
            ChannelError::NotRunning,
            ChannelError::WrongHandshakeMode,
        ];

        for variant in variants {
            let s = variant.as_str();
            assert!(!s.is_empty(), "ChannelError::{:?} has empty string", variant);
        }
    }

    #[test]
    fn channel_error_display() {
        let err = ChannelError::Busy;
        let display = format!("{}", err);
        assert_eq!(display, "channel busy");
    }

    // =========================================================================
    // Unified Error Tests
    // =========================================================================

    #[test]
    fn error_from_config_error() {
        let config_err = ConfigError::BlockSizeOutOfRange;
        let err: Error = config_err.into();

        match err {
            Error::Config(e) => assert_eq!(e, ConfigError::BlockSizeOutOfRange),
            Error::Channel(_) => panic!("Expected Error::Config"),
        }
    }

    #[test]
    fn error_from_channel_error() {
        let channel_err = ChannelError::EngineDisabled;
        let err: Error = channel_err.into();

        match err {
            Error::Channel(e) => assert_eq!(e, ChannelError::EngineDisabled),
            Error::Config(_) => panic!("Expected Error::Channel"),
        }
    }

    #[test]
    fn error_display_config() {
        let err = Error::Config(ConfigError::InvalidTransferType);
        let display = format!("{}", err);
        assert!(display.contains("config"));
        assert!(display.contains("multi-block"));
    }

    #[test]
    fn error_display_channel() {
        let err = Error::Channel(ChannelError::AlreadyRunning);
        let display = format!("{}", err);
        assert!(display.contains("channel"));
        assert!(display.contains("running"));
    }

    #[test]
    fn error_equality() {
        let err1 = Error::Channel(ChannelError::Busy);
        let err2 = Error::Channel(ChannelError::Busy);
        let err3 = Error::Channel(ChannelError::NotRunning);

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }

    // =========================================================================
    // Result Type Alias Tests
    // =========================================================================

    #[test]
    fn result_type_works() {
        fn test_fn() -> Result<u32> {
            Ok(42)
        }

        assert_eq!(test_fn().unwrap(), 42);
    }

    #[test]
    fn config_result_type_works() {
        fn test_fn() -> ConfigResult<u32> {
            Err(ConfigError::InvalidChannel)
        }

        assert!(test_fn().is_err());
    }

    #[test]
    fn channel_result_type_works() {
        fn test_fn() -> ChannelResult<u32> {
            Err(ChannelError::NotRunning)
        }

        assert!(test_fn().is_err());
    }
}
