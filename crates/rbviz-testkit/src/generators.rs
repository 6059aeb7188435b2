//! Proptest generators for property-based testing.

use proptest::prelude::*;

use crate::tree::{NodeRef, TestTree};

/// Largest number of non-leaf slots in a generated pointer graph.
pub const MAX_GRAPH_NODES: usize = 24;

/// Raw fields of one generated slot. Pointers index the arena; 0 is the leaf.
#[derive(Debug, Clone)]
pub struct SlotParams {
    pub value: i64,
    pub is_red: bool,
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub parent: Option<usize>,
}

/// A pointer into an arena of `slots` slots: absent, the leaf, or any node.
pub fn pointer(slots: usize) -> impl Strategy<Value = Option<usize>> {
    prop_oneof![
        1 => Just(None),
        2 => Just(Some(0)),
        4 => (0..slots).prop_map(Some),
    ]
}

/// One slot whose pointers stay inside an arena of `slots` slots.
pub fn slot(slots: usize) -> impl Strategy<Value = SlotParams> {
    (
        -1000i64..1000,
        any::<bool>(),
        pointer(slots),
        pointer(slots),
        pointer(slots),
    )
        .prop_map(|(value, is_red, left, right, parent)| SlotParams {
            value,
            is_red,
            left,
            right,
            parent,
        })
}

/// Build a pointer graph from generated slots.
pub fn graph_from_params(params: &[SlotParams]) -> TestTree {
    let mut tree = TestTree::new();
    let handles: Vec<NodeRef> = params.iter().map(|p| tree.add(p.value)).collect();
    for (&handle, p) in handles.iter().zip(params) {
        let node = tree.node_mut(handle);
        node.is_red = p.is_red;
        node.left = p.left.map(NodeRef);
        node.right = p.right.map(NodeRef);
        node.parent = p.parent.map(NodeRef);
    }
    tree
}

/// An arbitrary node graph (cycles, sharing, dangling leaves and all) and a
/// start node, which may be the leaf.
pub fn pointer_graph() -> impl Strategy<Value = (TestTree, NodeRef)> {
    (1..=MAX_GRAPH_NODES).prop_flat_map(|nodes| {
        let slots = nodes + 1;
        (prop::collection::vec(slot(slots), nodes), 0..slots)
            .prop_map(|(params, start)| (graph_from_params(&params), NodeRef(start)))
    })
}

/// A valid red-black tree holding `0..size` and a start node inside it.
pub fn balanced_tree(max_size: usize) -> impl Strategy<Value = (TestTree, NodeRef)> {
    (1..=max_size.max(1)).prop_flat_map(|size| {
        (1..=size).prop_map(move |start| {
            let values: Vec<i64> = (0..size as i64).collect();
            let (tree, _root) = TestTree::balanced(&values);
            (tree, NodeRef(start))
        })
    })
}
