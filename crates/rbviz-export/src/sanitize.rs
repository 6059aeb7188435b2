//! Sanitization: turn an arbitrary node graph into a canonical binary tree.
//!
//! Only `left`/`right` links are followed. Each node is placed at most
//! once, at the first position the walk reaches it; every later pointer to
//! it is recorded as a divergence instead of being descended into. This
//! terminates on cyclic and shared graphs and always yields a well-formed
//! binary tree.
//!
//! Ranks are handed out in in-order position while walking. The consumer
//! numbers nodes with the same in-order walk over the decoded nesting, so
//! the two sides agree on which integer names which node.

use std::collections::{HashMap, HashSet};

use rbviz_core::{ChildLink, ParentLink, Rank};
use tracing::{debug, warn};

use crate::graph::RedBlackGraph;

/// Outcome of climbing `parent` pointers from the requested node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootDiscovery<N> {
    pub root: N,
    /// The climb stopped because the parent chain revisited a node.
    pub cycled: bool,
}

/// How one canonical node's raw pointers differ from canonical structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Divergence {
    pub parent: ParentLink,
    pub left: ChildLink,
    pub right: ChildLink,
}

impl Divergence {
    pub fn is_empty(&self) -> bool {
        !self.parent.is_divergent() && !self.left.is_divergent() && !self.right.is_divergent()
    }
}

/// A node placed in the canonical tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalNode<N> {
    pub handle: N,
    pub left: Option<Rank>,
    pub right: Option<Rank>,
    pub parent: Option<Rank>,
    pub divergence: Divergence,
}

/// An acyclic binary tree derived from a node graph, indexed by rank.
///
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct CanonicalTree<N> {
    nodes: Vec<CanonicalNode<N>>,
    ranks: HashMap<N, Rank>,
    root: Rank,
    parent_chain_cycles: bool,
}

impl<N: Copy + Eq + std::hash::Hash> CanonicalTree<N> {
    pub fn root(&self) -> Rank {
        self.root
    }

    pub fn root_handle(&self) -> N {
        self.nodes[self.root.index()].handle
    }

    /// Number of nodes; always at least one.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, rank: Rank) -> &CanonicalNode<N> {
        &self.nodes[rank.index()]
    }

    /// All nodes in rank (in-order) order.
    pub fn nodes(&self) -> &[CanonicalNode<N>] {
        &self.nodes
    }

    pub fn rank_of(&self, handle: N) -> Option<Rank> {
        self.ranks.get(&handle).copied()
    }

    /// Whether root discovery ended on a cycle in the parent chain.
    pub fn parent_chain_cycles(&self) -> bool {
        self.parent_chain_cycles
    }

    /// Nodes whose raw pointers diverge, in rank order.
    pub fn divergences(&self) -> impl Iterator<Item = (Rank, &Divergence)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.divergence.is_empty())
            .map(|(index, node)| (Rank::from_index(index), &node.divergence))
    }

    pub fn divergence_count(&self) -> usize {
        self.divergences().count()
    }

    /// Ranks ordered so that every parent precedes its children.
    pub fn breadth_first(&self) -> Vec<Rank> {
        let mut order = Vec::with_capacity(self.nodes.len());
        order.push(self.root);
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

/// Follow `parent` pointers up from `node`.
///
/// Stops at a node without a parent, at a node whose parent is a leaf
/// boundary, or at the first node seen twice. In the cycle case that
/// repeated node becomes the effective root.
pub fn find_root<G: RedBlackGraph>(graph: &G, node: G::Node) -> RootDiscovery<G::Node> {
    let mut seen = HashSet::new();
    let mut root = node;
    loop {
        let Some(parent) = graph.parent(root) else {
            return RootDiscovery { root, cycled: false };
        };
        if graph.is_leaf(parent) {
            return RootDiscovery { root, cycled: false };
        }
        if !seen.insert(root) {
            warn!(?root, "parent chain cycles; using repeated node as root");
            return RootDiscovery { root, cycled: true };
        }
        root = parent;
    }
}

/// Build the canonical tree containing `node`.
///
/// Returns `None` when `node` is itself a leaf boundary: there is nothing
/// to show.
pub fn sanitize<G: RedBlackGraph>(graph: &G, node: G::Node) -> Option<CanonicalTree<G::Node>> {
    if graph.is_leaf(node) {
        return None;
    }
    Some(canonicalize(graph, find_root(graph, node)))
}

enum Visit {
    Enter,
    LeftDone,
}

/// Walk child links from a discovered root, assigning in-order ranks.
pub fn canonicalize<G: RedBlackGraph>(
    graph: &G,
    discovery: RootDiscovery<G::Node>,
) -> CanonicalTree<G::Node> {
    let RootDiscovery { root, cycled } = discovery;

    let mut visited = HashSet::new();
    visited.insert(root);
    let mut order: Vec<G::Node> = Vec::new();
    let mut ranks: HashMap<G::Node, Rank> = HashMap::new();
    let mut left_of: HashMap<G::Node, G::Node> = HashMap::new();
    let mut right_of: HashMap<G::Node, G::Node> = HashMap::new();

    // Explicit stack: degenerate inputs can be arbitrarily deep chains.
    // The right child is claimed only after the whole left subtree has been
    // walked, so the first in-order occurrence of a shared node wins.
    let mut stack = vec![(root, Visit::Enter)];
    while let Some((node, visit)) = stack.pop() {
        match visit {
            Visit::Enter => {
                stack.push((node, Visit::LeftDone));
                if let Some(left) = graph.left(node) {
                    if !graph.is_leaf(left) && visited.insert(left) {
                        left_of.insert(node, left);
                        stack.push((left, Visit::Enter));
                    }
                }
            }
            Visit::LeftDone => {
                ranks.insert(node, Rank::from_index(order.len()));
                order.push(node);
                if let Some(right) = graph.right(node) {
                    if !graph.is_leaf(right) && visited.insert(right) {
                        right_of.insert(node, right);
                        stack.push((right, Visit::Enter));
                    }
                }
            }
        }
    }

    let mut nodes: Vec<CanonicalNode<G::Node>> = order
        .iter()
        .map(|&handle| CanonicalNode {
            handle,
            left: left_of.get(&handle).map(|child| ranks[child]),
            right: right_of.get(&handle).map(|child| ranks[child]),
            parent: None,
            divergence: Divergence::default(),
        })
        .collect();

    for index in 0..nodes.len() {
        let rank = Rank::from_index(index);
        for child in [nodes[index].left, nodes[index].right].into_iter().flatten() {
            nodes[child.index()].parent = Some(rank);
        }
    }

    for node in &mut nodes {
        node.divergence = Divergence {
            parent: parent_link(graph, &ranks, node),
            left: child_link(graph, &ranks, node.left, graph.left(node.handle)),
            right: child_link(graph, &ranks, node.right, graph.right(node.handle)),
        };
    }

    let tree = CanonicalTree {
        root: ranks[&root],
        nodes,
        ranks,
        parent_chain_cycles: cycled,
    };
    debug!(
        nodes = tree.len(),
        divergences = tree.divergence_count(),
        cycled,
        "sanitized node graph"
    );
    tree
}

fn parent_link<G: RedBlackGraph>(
    graph: &G,
    ranks: &HashMap<G::Node, Rank>,
    node: &CanonicalNode<G::Node>,
) -> ParentLink {
    match (graph.parent(node.handle), node.parent) {
        (None, None) => ParentLink::Canonical,
        (None, Some(_)) => ParentLink::Absent,
        (Some(raw), canonical) => match ranks.get(&raw) {
            Some(&rank) if Some(rank) == canonical => ParentLink::Canonical,
            Some(&rank) => ParentLink::Node(rank),
            None => ParentLink::Outside,
        },
    }
}

fn child_link<G: RedBlackGraph>(
    graph: &G,
    ranks: &HashMap<G::Node, Rank>,
    canonical: Option<Rank>,
    raw: Option<G::Node>,
) -> ChildLink {
    if canonical.is_some() || graph.is_boundary(raw) {
        return ChildLink::Canonical;
    }
    match raw.and_then(|target| ranks.get(&target)) {
        Some(&rank) => ChildLink::Node(rank),
        None => ChildLink::Outside,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::arena::{Arena, LEAF};

    /// A perfect three-node tree: b(a, c).
    fn three_node() -> (Arena, [usize; 3]) {
        let mut arena = Arena::new();
        let a = arena.add(true);
        let b = arena.add(false);
        let c = arena.add(true);
        arena.link_left(b, a);
        arena.link_right(b, c);
        (arena, [a, b, c])
    }

    #[test]
    fn test_leaf_has_no_tree() {
        let arena = Arena::new();
        assert!(sanitize(&arena, LEAF).is_none());
    }

    #[test]
    fn test_node_missing_a_child_is_a_leaf() {
        let mut arena = Arena::new();
        let node = arena.add(false);
        arena.slots[node].right = None;
        assert!(sanitize(&arena, node).is_none());
    }

    #[test]
    fn test_valid_tree_has_no_divergences() {
        let (arena, [a, b, c]) = three_node();
        let tree = sanitize(&arena, c).unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.root_handle(), b);
        assert_eq!(tree.rank_of(a), Some(Rank(0)));
        assert_eq!(tree.rank_of(b), Some(Rank(1)));
        assert_eq!(tree.rank_of(c), Some(Rank(2)));
        assert_eq!(tree.divergence_count(), 0);
        assert!(!tree.parent_chain_cycles());

        let root = tree.node(tree.root());
        assert_eq!(root.left, Some(Rank(0)));
        assert_eq!(root.right, Some(Rank(2)));
        assert_eq!(tree.node(Rank(0)).parent, Some(Rank(1)));
    }

    #[test]
    fn test_self_right_pointer() {
        let mut arena = Arena::new();
        let node = arena.add(false);
        arena.slots[node].right = Some(node);

        let tree = sanitize(&arena, node).unwrap();
        assert_eq!(tree.len(), 1);
        let divergence = tree.node(Rank(0)).divergence;
        assert_eq!(divergence.right, ChildLink::Node(Rank(0)));
        assert_eq!(divergence.left, ChildLink::Canonical);
        assert_eq!(divergence.parent, ParentLink::Canonical);
    }

    #[test]
    fn test_self_parent_pointer() {
        let mut arena = Arena::new();
        let node = arena.add(false);
        arena.slots[node].parent = Some(node);

        let discovery = find_root(&arena, node);
        assert_eq!(discovery, RootDiscovery { root: node, cycled: true });

        let tree = sanitize(&arena, node).unwrap();
        assert!(tree.parent_chain_cycles());
        assert_eq!(tree.node(Rank(0)).divergence.parent, ParentLink::Node(Rank(0)));
    }

    #[test]
    fn test_shared_child_is_placed_once() {
        let mut arena = Arena::new();
        let n1 = arena.add(false);
        let n2 = arena.add(false);
        let n3 = arena.add(false);
        let n4 = arena.add(true);
        arena.link_left(n1, n2);
        arena.link_right(n1, n3);
        arena.link_right(n2, n4);
        arena.slots[n3].left = Some(n4);

        let tree = sanitize(&arena, n4).unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.rank_of(n2), Some(Rank(0)));
        assert_eq!(tree.rank_of(n4), Some(Rank(1)));
        assert_eq!(tree.rank_of(n1), Some(Rank(2)));
        assert_eq!(tree.rank_of(n3), Some(Rank(3)));

        let n3_node = tree.node(Rank(3));
        assert_eq!(n3_node.left, None);
        assert_eq!(n3_node.divergence.left, ChildLink::Node(Rank(1)));
        assert!(tree.node(Rank(1)).divergence.is_empty());
        assert_eq!(tree.divergence_count(), 1);
    }

    #[test]
    fn test_shared_child_parent_points_at_second_owner() {
        let mut arena = Arena::new();
        let n1 = arena.add(false);
        let n2 = arena.add(false);
        let n3 = arena.add(false);
        let n4 = arena.add(true);
        arena.link_left(n1, n2);
        arena.link_right(n1, n3);
        arena.slots[n2].right = Some(n4);
        arena.link_left(n3, n4);

        let tree = sanitize(&arena, n1).unwrap();
        // n4 is placed under n2, but its parent pointer names n3
        assert_eq!(tree.node(Rank(1)).parent, tree.rank_of(n2));
        assert_eq!(tree.node(Rank(1)).divergence.parent, ParentLink::Node(Rank(3)));
        assert_eq!(tree.node(Rank(3)).divergence.left, ChildLink::Node(Rank(1)));
    }

    #[test]
    fn test_mutual_parents() {
        let mut arena = Arena::new();
        let n5 = arena.add(false);
        let n6 = arena.add(false);
        arena.slots[n5].parent = Some(n6);
        arena.slots[n6].parent = Some(n5);

        let tree = sanitize(&arena, n5).unwrap();
        assert!(tree.parent_chain_cycles());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root_handle(), n5);
        assert_eq!(tree.node(Rank(0)).divergence.parent, ParentLink::Outside);
    }

    #[test]
    fn test_mutual_children() {
        let mut arena = Arena::new();
        let n5 = arena.add(false);
        let n6 = arena.add(true);
        arena.link_right(n5, n6);
        arena.slots[n6].left = Some(n5);

        let tree = sanitize(&arena, n5).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.node(Rank(1)).divergence.left, ChildLink::Node(Rank(0)));
    }

    #[test]
    fn test_missing_parent_below_root() {
        let (mut arena, [a, b, _]) = three_node();
        arena.slots[a].parent = None;

        let tree = sanitize(&arena, b).unwrap();
        assert_eq!(tree.node(Rank(0)).divergence.parent, ParentLink::Absent);
    }

    #[test]
    fn test_leaf_parent_stops_root_discovery() {
        let (mut arena, [_, b, _]) = three_node();
        arena.slots[b].parent = Some(LEAF);

        let discovery = find_root(&arena, b);
        assert_eq!(discovery, RootDiscovery { root: b, cycled: false });

        let tree = sanitize(&arena, b).unwrap();
        assert_eq!(tree.node(tree.root()).divergence.parent, ParentLink::Outside);
    }

    #[test]
    fn test_breadth_first_parents_precede_children() {
        let (arena, _) = three_node();
        let tree = sanitize(&arena, 1).unwrap();
        assert_eq!(tree.breadth_first(), vec![Rank(1), Rank(0), Rank(2)]);
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let mut arena = Arena::new();
        let mut prev = arena.add(false);
        let first = prev;
        for _ in 0..50_000 {
            let next = arena.add(false);
            arena.link_right(prev, next);
            prev = next;
        }

        let tree = sanitize(&arena, first).unwrap();
        assert_eq!(tree.len(), 50_001);
        assert_eq!(tree.rank_of(first), Some(Rank(0)));
        assert_eq!(tree.rank_of(prev), Some(Rank(50_000)));
    }

    mod props {
        use super::*;
        use crate::graph::arena::Slot;
        use proptest::prelude::*;

        fn arena_graph() -> impl Strategy<Value = (Arena, usize)> {
            (1usize..16).prop_flat_map(|nodes| {
                let slots = nodes + 1;
                let pointer = move || prop::option::of(0..slots);
                let slot = (pointer(), pointer(), pointer(), any::<bool>())
                    .prop_map(|(left, right, parent, red)| Slot { left, right, parent, red });
                (prop::collection::vec(slot, nodes), 0..slots).prop_map(|(generated, start)| {
                    let mut arena = Arena::new();
                    arena.slots.extend(generated);
                    (arena, start)
                })
            })
        }

        proptest! {
            #[test]
            fn canonical_tree_is_well_formed((arena, start) in arena_graph()) {
                let Some(tree) = sanitize(&arena, start) else {
                    prop_assert!(arena.is_leaf(start));
                    return Ok(());
                };

                let mut handles = HashSet::new();
                for (index, node) in tree.nodes().iter().enumerate() {
                    let rank = Rank::from_index(index);
                    prop_assert!(handles.insert(node.handle));
                    prop_assert!(!arena.is_leaf(node.handle));
                    prop_assert_eq!(tree.rank_of(node.handle), Some(rank));
                    if let Some(left) = node.left {
                        prop_assert!(left < rank);
                        prop_assert_eq!(tree.node(left).parent, Some(rank));
                    }
                    if let Some(right) = node.right {
                        prop_assert!(right > rank);
                        prop_assert_eq!(tree.node(right).parent, Some(rank));
                    }
                }
                prop_assert_eq!(tree.node(tree.root()).parent, None);
                prop_assert_eq!(tree.breadth_first().len(), tree.len());
            }
        }
    }
}

