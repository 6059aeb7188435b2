//! An arena-backed red-black node graph for tests.
//!
//! Every node stores an integer value and the sum of the values in its
//! subtree. Slot 0 is the shared dummy leaf; all of its pointers are
//! absent. Pointers are plain fields, so tests can corrupt them freely.

use rbviz_export::{RedBlackGraph, ValidationFailure, Validator};

/// Handle to a slot of a [`TestTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub usize);

impl NodeRef {
    /// The shared dummy leaf.
    pub const LEAF: NodeRef = NodeRef(0);
}

/// One slot of a [`TestTree`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestNode {
    pub value: i64,
    /// Sum of the values in the subtree rooted here.
    pub sum: i64,
    pub is_red: bool,
    pub left: Option<NodeRef>,
    pub right: Option<NodeRef>,
    pub parent: Option<NodeRef>,
}

/// A node graph whose nodes must be stored in ascending order of value.
#[derive(Debug, Clone)]
pub struct TestTree {
    nodes: Vec<TestNode>,
}

impl TestTree {
    /// An arena holding only the dummy leaf.
    pub fn new() -> Self {
        Self {
            nodes: vec![TestNode::default()],
        }
    }

    /// A black node whose children are the dummy leaf.
    pub fn add(&mut self, value: i64) -> NodeRef {
        self.push(TestNode {
            value,
            sum: value,
            left: Some(NodeRef::LEAF),
            right: Some(NodeRef::LEAF),
            ..TestNode::default()
        })
    }

    /// A black node with every pointer absent.
    pub fn add_detached(&mut self, value: i64) -> NodeRef {
        self.push(TestNode {
            value,
            sum: value,
            ..TestNode::default()
        })
    }

    fn push(&mut self, node: TestNode) -> NodeRef {
        self.nodes.push(node);
        NodeRef(self.nodes.len() - 1)
    }

    /// Number of slots, including the dummy leaf.
    pub fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every handle except the dummy leaf.
    pub fn handles(&self) -> impl Iterator<Item = NodeRef> {
        (1..self.nodes.len()).map(NodeRef)
    }

    pub fn node(&self, node: NodeRef) -> &TestNode {
        &self.nodes[node.0]
    }

    pub fn node_mut(&mut self, node: NodeRef) -> &mut TestNode {
        &mut self.nodes[node.0]
    }

    /// Set `child` as the left child of `parent`, and `parent` as its parent.
    pub fn link_left(&mut self, parent: NodeRef, child: NodeRef) {
        self.nodes[parent.0].left = Some(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Set `child` as the right child of `parent`, and `parent` as its parent.
    pub fn link_right(&mut self, parent: NodeRef, child: NodeRef) {
        self.nodes[parent.0].right = Some(child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub fn set_red(&mut self, node: NodeRef, is_red: bool) {
        self.nodes[node.0].is_red = is_red;
    }

    pub fn set_sum(&mut self, node: NodeRef, sum: i64) {
        self.nodes[node.0].sum = sum;
    }

    fn child_sum(&self, child: Option<NodeRef>) -> i64 {
        child.map_or(0, |child| self.nodes[child.0].sum)
    }

    /// Recompute the stored sum from the children. Returns whether it changed.
    pub fn augment(&mut self, node: NodeRef) -> bool {
        let slot = &self.nodes[node.0];
        let sum = self.child_sum(slot.left) + self.child_sum(slot.right) + slot.value;
        let changed = sum != slot.sum;
        self.nodes[node.0].sum = sum;
        changed
    }

    /// Build a balanced, correctly colored tree holding `values` in order.
    ///
    /// Handles are assigned in order, so `values[i]` lives at `NodeRef(i + 1)`.
    /// Nodes on the deepest level are red, unless that level is the root.
    /// Returns the root, or the dummy leaf when `values` is empty.
    pub fn balanced(values: &[i64]) -> (Self, NodeRef) {
        let mut tree = Self::new();
        let handles: Vec<NodeRef> = values.iter().map(|&value| tree.add(value)).collect();
        let mut depths = vec![0usize; handles.len()];
        let root = tree.build_range(&handles, &mut depths, 0, handles.len(), 0);

        let max_depth = depths.iter().copied().max().unwrap_or(0);
        if max_depth > 0 {
            for (handle, &depth) in handles.iter().zip(&depths) {
                if depth == max_depth {
                    tree.set_red(*handle, true);
                }
            }
        }
        (tree, root.unwrap_or(NodeRef::LEAF))
    }

    fn build_range(
        &mut self,
        handles: &[NodeRef],
        depths: &mut [usize],
        start: usize,
        end: usize,
        depth: usize,
    ) -> Option<NodeRef> {
        if start >= end {
            return None;
        }
        let mid = start + (end - start) / 2;
        let node = handles[mid];
        depths[mid] = depth;
        if let Some(left) = self.build_range(handles, depths, start, mid, depth + 1) {
            self.link_left(node, left);
        }
        if let Some(right) = self.build_range(handles, depths, mid + 1, end, depth + 1) {
            self.link_right(node, right);
        }
        self.augment(node);
        Some(node)
    }

    /// Non-leaf nodes reachable from `root` through child links, in order.
    ///
    /// Gives up after visiting as many nodes as the arena holds, so a
    /// cyclic graph still terminates.
    pub fn in_order(&self, root: NodeRef) -> Vec<NodeRef> {
        let mut order = Vec::new();
        let mut stack = Vec::new();
        let mut current = Some(root).filter(|&node| !self.is_leaf(node));
        while order.len() < self.nodes.len() {
            while let Some(node) = current {
                stack.push(node);
                current = self.node(node).left.filter(|&left| !self.is_leaf(left));
            }
            let Some(node) = stack.pop() else {
                break;
            };
            order.push(node);
            current = self.node(node).right.filter(|&right| !self.is_leaf(right));
        }
        order
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RedBlackGraph for TestTree {
    type Node = NodeRef;

    fn left(&self, node: NodeRef) -> Option<NodeRef> {
        self.nodes[node.0].left
    }

    fn right(&self, node: NodeRef) -> Option<NodeRef> {
        self.nodes[node.0].right
    }

    fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.nodes[node.0].parent
    }

    fn is_red(&self, node: NodeRef) -> bool {
        self.nodes[node.0].is_red
    }
}

/// Checks the augmented sums and the ascending order of values.
impl Validator<TestTree> for TestTree {
    fn check_node(&self, graph: &TestTree, node: NodeRef) -> Result<(), ValidationFailure> {
        let slot = graph.node(node);
        let expected = if graph.is_leaf(node) {
            0
        } else {
            graph.child_sum(slot.left) + graph.child_sum(slot.right) + slot.value
        };
        if slot.sum != expected {
            return Err(ValidationFailure::new("RuntimeException", "sum is wrong"));
        }
        Ok(())
    }

    fn check_subtree(&self, graph: &TestTree, root: NodeRef) -> Result<(), ValidationFailure> {
        let order = graph.in_order(root);
        for pair in order.windows(2) {
            if graph.node(pair[0]).value > graph.node(pair[1]).value {
                return Err(ValidationFailure::new(
                    "IllegalStateException",
                    "nodes are not in ascending order",
                ));
            }
        }
        Ok(())
    }
}

/// Debug text showing a node's value and sum.
pub fn value_and_sum(tree: &TestTree, node: NodeRef) -> Option<String> {
    let slot = tree.node(node);
    Some(format!("Value: {}\nSum: {}", slot.value, slot.sum))
}
