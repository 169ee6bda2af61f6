//! Event kinds and event-status masks.
//!
//! The controller latches five per-channel event kinds. Status bits stay
//! latched until explicitly cleared; a consumer that skips the clear will
//! see the interrupt re-fire.

// =============================================================================
// Event Kinds
// =============================================================================

/// One transfer event kind.
///
/// Within a single channel the kinds are raised in a fixed order:
/// transaction completes first, then the block complete at each block
/// boundary, then the transfer complete when the whole transfer retires.
/// `Error` can arrive at any point and latches the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    /// The whole transfer (all blocks) finished
    TransferComplete,
    /// One block finished
    BlockComplete,
    /// One source-side transaction (single or burst) finished
    SourceTransactionComplete,
    /// One destination-side transaction (single or burst) finished
    DestinationTransactionComplete,
    /// The backend reported a bus fault; the channel is latched off
    Error,
}

impl EventKind {
    /// The raw status bit for this kind.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            EventKind::TransferComplete => EVENT_TRANSFER_COMPLETE,
            EventKind::BlockComplete => EVENT_BLOCK_COMPLETE,
            EventKind::SourceTransactionComplete => EVENT_SRC_TRANSACTION,
            EventKind::DestinationTransactionComplete => EVENT_DST_TRANSACTION,
            EventKind::Error => EVENT_ERROR,
        }
    }
}

/// Raw bit: transfer complete
pub const EVENT_TRANSFER_COMPLETE: u8 = 1 << 0;
/// Raw bit: block complete
pub const EVENT_BLOCK_COMPLETE: u8 = 1 << 1;
/// Raw bit: source transaction complete
pub const EVENT_SRC_TRANSACTION: u8 = 1 << 2;
/// Raw bit: destination transaction complete
pub const EVENT_DST_TRANSACTION: u8 = 1 << 3;
/// Raw bit: error
pub const EVENT_ERROR: u8 = 1 << 4;

const EVENT_ALL: u8 = EVENT_TRANSFER_COMPLETE
    | EVENT_BLOCK_COMPLETE
    | EVENT_SRC_TRANSACTION
    | EVENT_DST_TRANSACTION
    | EVENT_ERROR;

// =============================================================================
// Event Set
// =============================================================================

/// A set of [`EventKind`]s, mirroring one channel's status or mask bank.
///
/// # Example
///
/// ```ignore
/// let set = EventSet::empty()
///     .with(EventKind::TransferComplete)
///     .with(EventKind::Error);
/// assert!(set.contains(EventKind::Error));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventSet(u8);

impl EventSet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// All five event kinds.
    #[must_use]
    pub const fn all() -> Self {
        Self(EVENT_ALL)
    }

    /// A set holding exactly one kind.
    #[must_use]
    pub const fn only(kind: EventKind) -> Self {
        Self(kind.bit())
    }

    /// Create from a raw status value; unknown bits are dropped.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw & EVENT_ALL)
    }

    /// Convert to the raw bit value (for write-1-to-clear banks).
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        self.0
    }

    /// True when no kind is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when `kind` is in the set.
    #[must_use]
    pub const fn contains(self, kind: EventKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// True when every kind in `other` is also in `self`.
    #[must_use]
    pub const fn contains_all(self, other: EventSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Copy of the set with `kind` added.
    #[must_use]
    pub const fn with(self, kind: EventKind) -> Self {
        Self(self.0 | kind.bit())
    }

    /// Copy of the set with `kind` removed.
    #[must_use]
    pub const fn without(self, kind: EventKind) -> Self {
        Self(self.0 & !kind.bit())
    }

    /// Set union.
    #[must_use]
    pub const fn union(self, other: EventSet) -> Self {
        Self(self.0 | other.0)
    }

    /// Set intersection.
    #[must_use]
    pub const fn intersect(self, other: EventSet) -> Self {
        Self(self.0 & other.0)
    }

    /// Set difference (`self` minus `other`).
    #[must_use]
    pub const fn difference(self, other: EventSet) -> Self {
        Self(self.0 & !other.0)
    }

    /// In-place insert.
    pub const fn insert(&mut self, kind: EventKind) {
        self.0 |= kind.bit();
    }

    /// In-place remove.
    pub const fn remove(&mut self, kind: EventKind) {
        self.0 &= !kind.bit();
    }
}

impl From<EventKind> for EventSet {
    fn from(kind: EventKind) -> Self {
        EventSet::only(kind)
    }
}

impl core::ops::BitOr for EventSet {
    type Output = EventSet;

    fn bitor(self, rhs: EventSet) -> EventSet {
        self.union(rhs)
    }
}

impl core::ops::BitOrAssign for EventSet {
    fn bitor_assign(&mut self, rhs: EventSet) {
        *self = self.union(rhs);
    }
}

// =============================================================================
// Dispatch Results
// =============================================================================

/// What a call to `dispatch_interrupt` serviced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchedEvent {
    /// The channel whose event was cleared
    pub channel: u8,
    /// The event kind that was serviced
    pub kind: EventKind,
}

/// Per-channel completion callback.
///
/// At most one handler is registered per channel; registering another
/// replaces it. Handlers run synchronously inside `dispatch_interrupt`,
/// typically in interrupt context: record what happened and return, then
/// act from the poll context (the same split the interrupt-safe wrapper
/// uses).
pub type EventHandler = fn(channel: u8, kind: EventKind);

// =============================================================================
// Unit Tests
// =============================================================================
