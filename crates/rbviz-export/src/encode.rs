//! Encoder: canonical tree to nested wire records.
//!
//! Canonical structure is carried by nesting alone, so a record only spells
//! out what nesting cannot: divergent pointers and captured errors. Wire size
//! grows with the number of anomalies, not with the size of the tree.

use rbviz_core::{ChildLink, Rank, WireChild, WireNode};

use crate::graph::RedBlackGraph;
use crate::sanitize::CanonicalTree;
use crate::validate::ValidationReport;

/// Supplies the optional debug text shown for each node.
///
/// Implemented for any `Fn(&G, G::Node) -> Option<String>`.
pub trait DebugStrings<G: RedBlackGraph + ?Sized> {
    fn debug_string(&self, graph: &G, node: G::Node) -> Option<String>;
}

impl<G, F> DebugStrings<G> for F
where
    G: RedBlackGraph + ?Sized,
    F: Fn(&G, G::Node) -> Option<String>,
{
    fn debug_string(&self, graph: &G, node: G::Node) -> Option<String> {
        self(graph, node)
    }
}

/// No debug text for any node.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDebugStrings;

impl<G: RedBlackGraph + ?Sized> DebugStrings<G> for NoDebugStrings {
    fn debug_string(&self, _graph: &G, _node: G::Node) -> Option<String> {
        None
    }
}

/// Encode the whole canonical tree, starting at its root.
///
/// Records are assembled bottom-up in reverse breadth-first order, so a
/// degenerate chain costs heap, not stack.
pub fn encode_tree<G, D>(
    graph: &G,
    tree: &CanonicalTree<G::Node>,
    report: &ValidationReport,
    debug_strings: &D,
) -> WireNode
where
    G: RedBlackGraph,
    D: DebugStrings<G> + ?Sized,
{
    let encoder = Encoder {
        graph,
        tree,
        report,
        debug_strings,
    };

    let root = tree.root();
    let mut built: Vec<Option<WireNode>> = (0..tree.len()).map(|_| None).collect();
    for rank in tree.breadth_first().into_iter().rev() {
        if rank != root {
            let record = encoder.assemble(rank, &mut built);
            built[rank.index()] = Some(record);
        }
    }
    encoder.assemble(root, &mut built)
}

struct Encoder<'a, G: RedBlackGraph, D: ?Sized> {
    graph: &'a G,
    tree: &'a CanonicalTree<G::Node>,
    report: &'a ValidationReport,
    debug_strings: &'a D,
}

impl<G, D> Encoder<'_, G, D>
where
    G: RedBlackGraph,
    D: DebugStrings<G> + ?Sized,
{
    /// Build the record for `rank`, moving in its already-built children.
    fn assemble(&self, rank: Rank, built: &mut [Option<WireNode>]) -> WireNode {
        let node = self.tree.node(rank);
        let mut record = WireNode::new(self.graph.is_red(node.handle));
        record.debug = self.debug_strings.debug_string(self.graph, node.handle);
        record.error = self.report.node_error(rank).map(str::to_owned);
        if rank == self.tree.root() {
            record.subtree_error = self.report.subtree_error.clone();
        }
        record.parent = node.divergence.parent.to_wire();
        record.left = child(node.left, node.divergence.left, built);
        record.right = child(node.right, node.divergence.right, built);
        record
    }
}

fn child(
    canonical: Option<Rank>,
    link: ChildLink,
    built: &mut [Option<WireNode>],
) -> Option<WireChild> {
    match canonical {
        Some(child) => built[child.index()]
            .take()
            .map(|record| WireChild::Node(Box::new(record))),
        None => link.to_wire().map(WireChild::Ref),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::arena::Arena;
    use crate::sanitize::sanitize;
    use crate::validate::{validate_tree, NoValidation};

    fn encode_from(arena: &Arena, node: usize) -> WireNode {
        let tree = sanitize(arena, node).unwrap();
        let report = validate_tree(arena, &tree, &NoValidation);
        encode_tree(arena, &tree, &report, &NoDebugStrings)
    }

    #[test]
    fn test_clean_tree_has_no_reference_fields() {
        let mut arena = Arena::new();
        let a = arena.add(true);
        let b = arena.add(false);
        arena.link_left(b, a);

        let root = encode_from(&arena, b);
        assert!(!root.is_red);
        assert_eq!(root.parent, None);
        assert_eq!(root.right, None);
        let Some(WireChild::Node(left)) = &root.left else {
            panic!("expected nested left child");
        };
        assert!(left.is_red);
        assert_eq!(left.parent, None);
        assert_eq!(left.left, None);
    }

    #[test]
    fn test_self_reference_is_a_rank() {
        let mut arena = Arena::new();
        let node = arena.add(false);
        arena.slots[node].right = Some(node);

        let root = encode_from(&arena, node);
        assert_eq!(root.right, Some(WireChild::Ref(0)));
        assert_eq!(root.left, None);
    }

    #[test]
    fn test_parent_sentinels() {
        let mut arena = Arena::new();
        let a = arena.add(true);
        let b = arena.add(false);
        let stray = arena.add(false);
        arena.link_left(b, a);
        arena.slots[a].parent = Some(stray);

        let root = encode_from(&arena, b);
        let Some(WireChild::Node(left)) = &root.left else {
            panic!("expected nested left child");
        };
        assert_eq!(left.parent, Some(Some(-1)));

        arena.slots[a].parent = None;
        let root = encode_from(&arena, b);
        let Some(WireChild::Node(left)) = &root.left else {
            panic!("expected nested left child");
        };
        assert_eq!(left.parent, Some(None));
    }

    #[test]
    fn test_long_chain_is_encoded_in_order() {
        let mut arena = Arena::new();
        let handles: Vec<usize> = (0..50_000).map(|_| arena.add(false)).collect();
        for pair in handles.windows(2) {
            arena.link_right(pair[0], pair[1]);
        }

        let root = encode_from(&arena, handles[handles.len() - 1]);
        let mut depth = 0;
        let mut cursor = &root;
        while let Some(WireChild::Node(next)) = &cursor.right {
            assert_eq!(next.parent, None);
            assert_eq!(next.left, None);
            cursor = &**next;
            depth += 1;
        }
        assert_eq!(depth, handles.len() - 1);
    }

    #[test]
    fn test_debug_strings_closure() {
        let mut arena = Arena::new();
        let node = arena.add(false);
        let tree = sanitize(&arena, node).unwrap();
        let report = validate_tree(&arena, &tree, &NoValidation);

        let label = |_: &Arena, handle: usize| Some(format!("slot {}", handle));
        let root = encode_tree(&arena, &tree, &report, &label);
        assert_eq!(root.debug.as_deref(), Some("slot 1"));

        let silent = |_: &Arena, _: usize| -> Option<String> { None };
        let root = encode_tree(&arena, &tree, &report, &silent);
        assert_eq!(root.debug, None);
    }
}
