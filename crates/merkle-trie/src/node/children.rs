//! Implementation of a 16-element branch node children array.
//! It stores an additional bit flag indicating which child is not empty.
use crate::node::Node;
use core::slice::Iter;

/// Children of a branch node, indexed by nibble. An empty slot holds [`Node::Null`].
#[derive(Debug, Clone, Default)]
pub struct BranchChildren {
    children: [Node; 16],
    flags: u16,
}

impl BranchChildren {
    /// All slots empty.
    #[inline]
    pub const fn new() -> Self {
        Self { children: [const { Node::Null }; 16], flags: 0 }
    }

    /// Child at `idx`, [`Node::Null`] when the slot is empty.
    #[inline]
    pub fn get(&self, idx: u8) -> &Node {
        &self.children[idx as usize]
    }

    /// Stores `node` at `idx`. Storing [`Node::Null`] clears the slot.
    #[inline]
    pub fn set(&mut self, idx: u8, node: Node) {
        if node.is_null() {
            self.flags &= !(1 << idx);
        } else {
            self.flags |= 1 << idx;
        }
        self.children[idx as usize] = node;
    }

    /// Copy of `self` with the slot at `idx` replaced. Other children are shared.
    #[inline]
    pub fn with(&self, idx: u8, node: Node) -> Self {
        let mut children = self.clone();
        children.set(idx, node);
        children
    }

    /// Number of occupied slots.
    #[inline]
    pub const fn count(&self) -> u32 {
        self.flags.count_ones()
    }

    /// Whether every slot is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.flags == 0
    }

    /// The index and the node of the only occupied slot, if exactly one is occupied.
    #[inline]
    pub fn only_child(&self) -> Option<(u8, &Node)> {
        if self.flags == 0 || self.flags & (self.flags - 1) != 0 {
            None
        } else {
            let idx = self.flags.trailing_zeros() as u8;
            Some((idx, &self.children[idx as usize]))
        }
    }

    /// All 16 slots in nibble order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, Node> {
        self.children.iter()
    }
}

impl<'a> IntoIterator for &'a BranchChildren {
    type Item = &'a Node;
    type IntoIter = Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
