//! Linked-list descriptor arena.
//!
//! Multi-block transfers in linked-list mode walk a chain of nodes, each
//! holding one block [`Descriptor`] and an optional next link. The arena
//! owns the nodes by value (no heap) and hands out [`NodeHandle`]s; a
//! channel stores only the head handle, never a borrow, so chains can be
//! built and rebuilt without lifetimes reaching the driver.

use super::descriptor::Descriptor;
use super::error::{ConfigError, ConfigResult};

// =============================================================================
// Handles and Nodes
// =============================================================================

/// Opaque index of a node inside its [`DescriptorArena`].
///
/// Handles are only meaningful against the arena that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeHandle(pub u16);

impl NodeHandle {
    /// Arena slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One chain node: a block descriptor plus the link to the next node.
///
/// `next == None` marks the end of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ListNode {
    /// Block parameters for this link of the chain
    pub descriptor: Descriptor,
    /// Next node, or `None` at the chain end
    pub next: Option<NodeHandle>,
}

// =============================================================================
// Descriptor Arena
// =============================================================================

/// Fixed-capacity node storage for linked-list chains.
///
/// # Example
///
/// ```ignore
/// let mut arena: DescriptorArena<8> = DescriptorArena::new();
/// let head = arena.chain(&[desc_a, desc_b, desc_c])?;
/// channel.initialize(config.with_linked_list_head(head))?;
/// ```
#[derive(Debug)]
pub struct DescriptorArena<const CAPACITY: usize> {
    nodes: [ListNode; CAPACITY],
    len: usize,
}

impl<const CAPACITY: usize> Default for DescriptorArena<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAPACITY: usize> DescriptorArena<CAPACITY> {
    /// Create an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        const EMPTY: ListNode = ListNode {
            descriptor: Descriptor::new(0, 0),
            next: None,
        };
        Self {
            nodes: [EMPTY; CAPACITY],
            len: 0,
        }
    }

    /// Number of nodes pushed so far.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True when no node has been pushed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots still available.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        CAPACITY - self.len
    }

    /// Validate `descriptor` and append it as an unlinked node.
    ///
    /// # Errors
    ///
    /// Descriptor validation errors pass through; a full arena reports
    /// [`ConfigError::InvalidChain`].
    pub fn push(&mut self, descriptor: Descriptor) -> ConfigResult<NodeHandle> {
        descriptor.validate()?;
        if self.len == CAPACITY {
            return Err(ConfigError::InvalidChain);
        }
        let handle = NodeHandle(self.len as u16);
        self.nodes[self.len] = ListNode {
            descriptor,
            next: None,
        };
        self.len += 1;
        Ok(handle)
    }

    /// Link `from` to `to`.
    ///
    /// Links only run forward (`to` must be a later slot than `from`), which
    /// keeps every chain acyclic by construction.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidChain`] for unknown handles or a
    /// backward/self link.
    pub fn link(&mut self, from: NodeHandle, to: NodeHandle) -> ConfigResult<()> {
        if from.index() >= self.len || to.index() >= self.len {
            return Err(ConfigError::InvalidChain);
        }
        if to.index() <= from.index() {
            return Err(ConfigError::InvalidChain);
        }
        self.nodes[from.index()].next = Some(to);
        Ok(())
    }

    /// Push a whole chain at once and return its head.
    ///
    /// All-or-nothing: the arena is untouched when any descriptor fails
    /// validation or the chain does not fit.
    ///
    /// # Errors
    ///
    /// An empty slice or insufficient capacity reports
    /// [`ConfigError::InvalidChain`]; descriptor errors pass through.
    pub fn chain(&mut self, descriptors: &[Descriptor]) -> ConfigResult<NodeHandle> {
        if descriptors.is_empty() || descriptors.len() > self.remaining() {
            return Err(ConfigError::InvalidChain);
        }
        for descriptor in descriptors {
            descriptor.validate()?;
        }

        let head = NodeHandle(self.len as u16);
        for (i, descriptor) in descriptors.iter().enumerate() {
            let slot = self.len + i;
            let next = if i + 1 < descriptors.len() {
                Some(NodeHandle((slot + 1) as u16))
            } else {
                None
            };
            self.nodes[slot] = ListNode {
                descriptor: *descriptor,
                next,
            };
        }
        self.len += descriptors.len();
        Ok(head)
    }

    /// Look up a node; `None` for a stale or foreign handle.
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&ListNode> {
        if handle.index() < self.len {
            Some(&self.nodes[handle.index()])
        } else {
            None
        }
    }

    /// The populated node slice, in slot order.
    ///
    /// This is the image a backend walks when executing a linked-list
    /// transfer.
    #[must_use]
    pub fn nodes(&self) -> &[ListNode] {
        &self.nodes[..self.len]
    }

    /// Walk a chain from `head` and return its length in nodes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidChain`] for an unknown head, a dangling
    /// link, or a cycle.
    pub fn walk(&self, head: NodeHandle) -> ConfigResult<usize> {
        if head.index() >= self.len {
            return Err(ConfigError::InvalidChain);
        }

        let mut visited = [false; CAPACITY];
        let mut count = 0;
        let mut cursor = Some(head);
        while let Some(handle) = cursor {
            if handle.index() >= self.len {
                return Err(ConfigError::InvalidChain);
            }
            if visited[handle.index()] {
                return Err(ConfigError::InvalidChain);
            }
            visited[handle.index()] = true;
            count += 1;
            cursor = self.nodes[handle.index()].next;
        }
        Ok(count)
    }

    /// Drop every node. Outstanding handles become stale.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::descriptor::MAX_BLOCK_SIZE;

    fn desc(block: u16) -> Descriptor {
        Descriptor::new(0x2000_0000, 0x2000_8000).with_block_size(block)
    }

    #[test]
    fn new_arena_is_empty() {
        let arena: DescriptorArena<4> = DescriptorArena::new();
        assert!(arena.is_empty());
        assert_eq!(arena.len(), 0);
        assert_eq!(arena.remaining(), 4);
    }

    #[test]
    fn push_returns_sequential_handles() {
        let mut arena: DescriptorArena<4> = DescriptorArena::new();
        let a = arena.push(desc(1)).unwrap();
        let b = arena.push(desc(2)).unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn push_validates_descriptor() {
        let mut arena: DescriptorArena<4> = DescriptorArena::new();
        let err = arena.push(desc(MAX_BLOCK_SIZE + 1)).unwrap_err();
        assert_eq!(err, ConfigError::BlockSizeOutOfRange);
        assert!(arena.is_empty());
    }

    #[test]
    fn push_into_full_arena_rejected() {
        let mut arena: DescriptorArena<2> = DescriptorArena::new();
        arena.push(desc(1)).unwrap();
        arena.push(desc(1)).unwrap();
        assert_eq!(arena.push(desc(1)), Err(ConfigError::InvalidChain));
    }

    #[test]
    fn link_forward_only() {
        let mut arena: DescriptorArena<4> = DescriptorArena::new();
        let a = arena.push(desc(1)).unwrap();
        let b = arena.push(desc(2)).unwrap();

        assert!(arena.link(a, b).is_ok());
        assert_eq!(arena.node(a).unwrap().next, Some(b));

        assert_eq!(arena.link(b, a), Err(ConfigError::InvalidChain));
        assert_eq!(arena.link(a, a), Err(ConfigError::InvalidChain));
    }

    #[test]
    fn link_rejects_unknown_handles() {
        let mut arena: DescriptorArena<4> = DescriptorArena::new();
        let a = arena.push(desc(1)).unwrap();
        assert_eq!(arena.link(a, NodeHandle(9)), Err(ConfigError::InvalidChain));
        assert_eq!(arena.link(NodeHandle(9), a), Err(ConfigError::InvalidChain));
    }

    #[test]
    fn chain_links_in_order() {
        let mut arena: DescriptorArena<8> = DescriptorArena::new();
        let head = arena.chain(&[desc(1), desc(2), desc(3)]).unwrap();

        assert_eq!(arena.len(), 3);
        assert_eq!(arena.walk(head), Ok(3));

        let first = arena.node(head).unwrap();
        assert_eq!(first.descriptor.block_size, 1);
        let second = arena.node(first.next.unwrap()).unwrap();
        assert_eq!(second.descriptor.block_size, 2);
        let third = arena.node(second.next.unwrap()).unwrap();
        assert_eq!(third.descriptor.block_size, 3);
        assert_eq!(third.next, None);
    }

    #[test]
    fn chain_rejects_empty_slice() {
        let mut arena: DescriptorArena<8> = DescriptorArena::new();
        assert_eq!(arena.chain(&[]), Err(ConfigError::InvalidChain));
    }

    #[test]
    fn chain_is_all_or_nothing_on_overflow() {
        let mut arena: DescriptorArena<2> = DescriptorArena::new();
        arena.push(desc(1)).unwrap();
        assert_eq!(
            arena.chain(&[desc(2), desc(3)]),
            Err(ConfigError::InvalidChain)
        );
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn chain_is_all_or_nothing_on_bad_descriptor() {
        let mut arena: DescriptorArena<8> = DescriptorArena::new();
        assert_eq!(
            arena.chain(&[desc(1), desc(0)]),
            Err(ConfigError::BlockSizeOutOfRange)
        );
        assert!(arena.is_empty());
    }

    #[test]
    fn walk_detects_dangling_head() {
        let arena: DescriptorArena<4> = DescriptorArena::new();
        assert_eq!(arena.walk(NodeHandle(0)), Err(ConfigError::InvalidChain));
    }

    #[test]
    fn walk_counts_single_node() {
        let mut arena: DescriptorArena<4> = DescriptorArena::new();
        let a = arena.push(desc(1)).unwrap();
        assert_eq!(arena.walk(a), Ok(1));
    }

    #[test]
    fn clear_invalidates_handles() {
        let mut arena: DescriptorArena<4> = DescriptorArena::new();
        let a = arena.push(desc(1)).unwrap();
        arena.clear();
        assert!(arena.is_empty());
        assert!(arena.node(a).is_none());
        assert_eq!(arena.walk(a), Err(ConfigError::InvalidChain));
    }

    #[test]
    fn nodes_slice_matches_len() {
        let mut arena: DescriptorArena<4> = DescriptorArena::new();
        arena.chain(&[desc(1), desc(2)]).unwrap();
        assert_eq!(arena.nodes().len(), 2);
    }
}
