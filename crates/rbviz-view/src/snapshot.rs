//! The decoded tree handed to a renderer.

use rbviz_core::Rank;

/// How a raw pointer recovered from the snapshot relates to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerStatus {
    /// The pointer names a node in the tree (possibly the canonical one).
    #[default]
    Present,
    /// The pointer is absent (a missing parent, or a leaf-boundary child).
    Absent,
    /// The pointer names the node itself.
    SelfReference,
    /// The root's parent chain loops back into the tree.
    Cyclic,
    /// The pointer names a node that is not in the tree.
    Outside,
}

/// One node of a decoded snapshot.
///
/// Structural fields are filled by the decoder; metadata fields are zero
/// until [`derive`](crate::derive) runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedNode {
    /// In-order rank; also the index into [`Snapshot::nodes`].
    pub id: Rank,
    pub is_red: bool,
    pub debug: Option<String>,
    /// Per-node validation error.
    pub error: Option<String>,
    /// Whole-subtree validation error; only meaningful at the root.
    pub subtree_error: Option<String>,

    // Canonical structure
    pub left: Option<Rank>,
    pub right: Option<Rank>,
    pub parent: Option<Rank>,

    // Raw pointers as they were in the source graph
    pub unsanitized_parent: Option<Rank>,
    pub parent_status: PointerStatus,
    pub unsanitized_left: Option<Rank>,
    pub left_status: PointerStatus,
    pub unsanitized_right: Option<Rank>,
    pub right_status: PointerStatus,

    // Derived metadata
    pub size: u32,
    pub depth: u32,
    pub height: u32,
    pub black_depth: u32,
    pub black_height: u32,
    pub are_black_paths_equal: bool,
    pub has_error: bool,
    pub subtree_has_error: bool,
}

impl DecodedNode {
    pub(crate) fn new(id: Rank, is_red: bool) -> Self {
        Self {
            id,
            is_red,
            debug: None,
            error: None,
            subtree_error: None,
            left: None,
            right: None,
            parent: None,
            unsanitized_parent: None,
            parent_status: PointerStatus::Present,
            unsanitized_left: None,
            left_status: PointerStatus::Absent,
            unsanitized_right: None,
            right_status: PointerStatus::Absent,
            size: 0,
            depth: 0,
            height: 0,
            black_depth: 0,
            black_height: 0,
            are_black_paths_equal: false,
            has_error: false,
            subtree_has_error: false,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether the raw parent pointer disagrees with the canonical parent.
    pub fn parent_diverges(&self) -> bool {
        self.parent_status != PointerStatus::Present || self.unsanitized_parent != self.parent
    }

    pub fn left_diverges(&self) -> bool {
        child_diverges(self.left_status, self.unsanitized_left, self.left)
    }

    pub fn right_diverges(&self) -> bool {
        child_diverges(self.right_status, self.unsanitized_right, self.right)
    }
}

fn child_diverges(status: PointerStatus, raw: Option<Rank>, canonical: Option<Rank>) -> bool {
    status == PointerStatus::Outside || raw != canonical
}

/// A decoded tree plus the snapshot's title and selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub title: Option<String>,
    /// The node to highlight initially, when it is in the tree.
    pub selected: Option<Rank>,
    pub root: Option<Rank>,
    /// The id table: `nodes[i].id == Rank(i)`.
    pub nodes: Vec<DecodedNode>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: Rank) -> Option<&DecodedNode> {
        self.nodes.get(id.index())
    }

    pub fn root_node(&self) -> Option<&DecodedNode> {
        self.root.and_then(|root| self.get(root))
    }

    pub fn selected_node(&self) -> Option<&DecodedNode> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Whether any node carries an error.
    pub fn has_errors(&self) -> bool {
        self.root_node().map_or(false, |root| root.subtree_has_error)
    }

    /// Ranks ordered so that every parent precedes its children.
    pub fn breadth_first(&self) -> Vec<Rank> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        let mut order = Vec::with_capacity(self.nodes.len());
        order.push(root);
        let mut next = 0;
        while next < order.len() {
            let node = &self.nodes[order[next].index()];
            order.extend(node.left);
            order.extend(node.right);
            next += 1;
        }
        order
    }
}
