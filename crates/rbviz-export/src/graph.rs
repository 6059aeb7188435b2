//! The node graph interface supplied by a red-black tree library.

use std::fmt;
use std::hash::Hash;

/// Read-only view of a red-black node graph.
///
/// `Node` is a cheap handle (an index, a pointer wrapper, ...). Any pointer
/// may be absent, a dummy leaf sentinel, or an arbitrary node including the
/// node itself; nothing here assumes the graph is a tree.
///
/// Callers must keep the graph stable for the duration of one export.
pub trait RedBlackGraph {
    type Node: Copy + Eq + Hash + fmt::Debug;

    fn left(&self, node: Self::Node) -> Option<Self::Node>;

    fn right(&self, node: Self::Node) -> Option<Self::Node>;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn is_red(&self, node: Self::Node) -> bool;

    /// Whether `node` terminates the tree.
    ///
    /// A node with at least one absent child is a leaf boundary regardless
    /// of its other fields.
    fn is_leaf(&self, node: Self::Node) -> bool {
        self.left(node).is_none() || self.right(node).is_none()
    }

    /// Whether a child pointer ends traversal: absent, or a leaf boundary.
    fn is_boundary(&self, pointer: Option<Self::Node>) -> bool {
        pointer.map_or(true, |node| self.is_leaf(node))
    }
}

impl<G: RedBlackGraph + ?Sized> RedBlackGraph for &G {
    type Node = G::Node;

    fn left(&self, node: Self::Node) -> Option<Self::Node> {
        (**self).left(node)
    }

    fn right(&self, node: Self::Node) -> Option<Self::Node> {
        (**self).right(node)
    }

    fn parent(&self, node: Self::Node) -> Option<Self::Node> {
        (**self).parent(node)
    }

    fn is_red(&self, node: Self::Node) -> bool {
        (**self).is_red(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three slots: 0 is a sentinel leaf, 1 has both children, 2 is missing one.
    struct Slots;

    impl RedBlackGraph for Slots {
        type Node = usize;

        fn left(&self, node: usize) -> Option<usize> {
            match node {
                1 | 2 => Some(0),
                _ => None,
            }
        }

        fn right(&self, node: usize) -> Option<usize> {
            match node {
                1 => Some(0),
                _ => None,
            }
        }

        fn parent(&self, _node: usize) -> Option<usize> {
            None
        }

        fn is_red(&self, _node: usize) -> bool {
            false
        }
    }

    #[test]
    fn test_leaf_rule() {
        assert!(Slots.is_leaf(0));
        assert!(!Slots.is_leaf(1));
        assert!(Slots.is_leaf(2));
    }

    #[test]
    fn test_boundary_rule() {
        assert!(Slots.is_boundary(None));
        assert!(Slots.is_boundary(Some(0)));
        assert!(!Slots.is_boundary(Some(1)));
        assert!((&Slots).is_boundary(Some(2)));
    }
}

/// A minimal arena graph for unit tests across this crate.
#[cfg(test)]
pub(crate) mod arena {
    use super::RedBlackGraph;

    /// Slot 0 is the shared leaf sentinel.
    pub const LEAF: usize = 0;

    #[derive(Debug, Clone, Default)]
    pub struct Slot {
        pub left: Option<usize>,
        pub right: Option<usize>,
        pub parent: Option<usize>,
        pub red: bool,
    }

    #[derive(Debug, Clone)]
    pub struct Arena {
        pub slots: Vec<Slot>,
    }

    impl Arena {
        pub fn new() -> Self {
            Self {
                slots: vec![Slot::default()],
            }
        }

        /// Add a detached node whose children are the leaf sentinel.
        pub fn add(&mut self, red: bool) -> usize {
            self.slots.push(Slot {
                left: Some(LEAF),
                right: Some(LEAF),
                parent: None,
                red,
            });
            self.slots.len() - 1
        }

        pub fn link_left(&mut self, parent: usize, child: usize) {
            self.slots[parent].left = Some(child);
            self.slots[child].parent = Some(parent);
        }

        pub fn link_right(&mut self, parent: usize, child: usize) {
            self.slots[parent].right = Some(child);
            self.slots[child].parent = Some(parent);
        }
    }

    impl RedBlackGraph for Arena {
        type Node = usize;

        fn left(&self, node: usize) -> Option<usize> {
            self.slots[node].left
        }

        fn right(&self, node: usize) -> Option<usize> {
            self.slots[node].right
        }

        fn parent(&self, node: usize) -> Option<usize> {
            self.slots[node].parent
        }

        fn is_red(&self, node: usize) -> bool {
            self.slots[node].red
        }
    }
}
