//! Strong type definitions shared by the producer and the consumer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The 0-based in-order position of a node in the canonical tree.
///
/// Ranks are dense over `0..n` and strictly increase left to right. Both
/// sides of the pipeline number nodes with the same in-order walk, which
/// is what lets a bare integer on the wire name a node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(pub u32);

impl Rank {
    /// Index into a rank-ordered table.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Build a rank from a table index.
    ///
    /// Trees are limited to `u32::MAX` nodes.
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Interpret a wire integer as a rank within a tree of `len` nodes.
    pub fn from_wire(value: i64, len: usize) -> Option<Self> {
        usize::try_from(value)
            .ok()
            .filter(|&index| index < len)
            .map(Self::from_index)
    }

    pub const fn to_wire(self) -> i64 {
        self.0 as i64
    }
}

impl fmt::Debug for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rank({})", self.0)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Rank {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Wire sentinel for a pointer whose target is not in the canonical tree.
pub const OUTSIDE_TREE: i64 = -1;

/// How a node's raw `parent` pointer relates to its canonical parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentLink {
    /// The raw parent is exactly the canonical parent (or both are absent at the root).
    #[default]
    Canonical,
    /// The raw parent is absent but the node is not the canonical root.
    Absent,
    /// The raw parent is a node in the canonical tree other than the canonical parent.
    ///
    /// This includes the node itself and, at the root, a parent chain that cycles.
    Node(Rank),
    /// The raw parent is a node that does not appear in the canonical tree.
    Outside,
}

impl ParentLink {
    /// Encode as the optional `p` field: `None` omits the key, `Some(None)` writes `null`.
    pub fn to_wire(self) -> Option<Option<i64>> {
        match self {
            ParentLink::Canonical => None,
            ParentLink::Absent => Some(None),
            ParentLink::Node(rank) => Some(Some(rank.to_wire())),
            ParentLink::Outside => Some(Some(OUTSIDE_TREE)),
        }
    }

    /// Decode the optional `p` field for a tree of `len` nodes.
    ///
    /// Out-of-range ranks are read as [`ParentLink::Outside`]; they are data,
    /// not a parse failure.
    pub fn from_wire(value: Option<Option<i64>>, len: usize) -> Self {
        match value {
            None => ParentLink::Canonical,
            Some(None) => ParentLink::Absent,
            Some(Some(n)) => Rank::from_wire(n, len).map_or(ParentLink::Outside, ParentLink::Node),
        }
    }

    pub fn is_divergent(self) -> bool {
        self != ParentLink::Canonical
    }
}

/// How a node's raw `left` or `right` pointer relates to its canonical child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildLink {
    /// The raw pointer is the canonical child, or a leaf boundary where the
    /// canonical tree has no child.
    #[default]
    Canonical,
    /// The raw pointer reaches a non-leaf node that was already placed elsewhere.
    Node(Rank),
    /// The raw pointer reaches a non-leaf node that is not in the canonical tree.
    Outside,
}

impl ChildLink {
    /// Decode an integer child reference for a tree of `len` nodes.
    pub fn from_wire(value: i64, len: usize) -> Self {
        Rank::from_wire(value, len).map_or(ChildLink::Outside, ChildLink::Node)
    }

    pub fn to_wire(self) -> Option<i64> {
        match self {
            ChildLink::Canonical => None,
            ChildLink::Node(rank) => Some(rank.to_wire()),
            ChildLink::Outside => Some(OUTSIDE_TREE),
        }
    }

    pub fn is_divergent(self) -> bool {
        self != ChildLink::Canonical
    }
}
