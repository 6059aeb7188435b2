//! Properties of the export-then-load pipeline over arbitrary node graphs.

use proptest::prelude::*;

use rbviz::export::{export, export_plain, export_validated, sanitize, ExportOptions, RedBlackGraph};
use rbviz::view::load;
use rbviz_testkit::generators::{balanced_tree, pointer_graph};
use rbviz_testkit::{reference_tree, value_and_sum};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn ranks_are_dense((tree, start) in pointer_graph()) {
        let snapshot = load(&export_plain(&tree, start).unwrap()).unwrap();
        for (index, node) in snapshot.nodes.iter().enumerate() {
            prop_assert_eq!(node.id.index(), index);
        }
        prop_assert!(snapshot.len() < tree.slot_count());
        prop_assert_eq!(snapshot.is_empty(), tree.is_leaf(start));
    }

    #[test]
    fn pipeline_matches_reference((tree, start) in pointer_graph()) {
        let text = export(&tree, start, &ExportOptions::default(), &tree, &value_and_sum).unwrap();
        let snapshot = load(&text).unwrap();
        let reference = reference_tree(&tree, start);
        prop_assert_eq!(snapshot.is_empty(), reference.is_none());

        if let Some(reference) = reference {
            prop_assert_eq!(snapshot.root.map(|r| r.index()), Some(reference.root));
            prop_assert_eq!(snapshot.selected.map(|r| r.index()), reference.rank_of(start));
            for (node, expected) in snapshot.nodes.iter().zip(&reference.nodes) {
                prop_assert_eq!(node.is_red, expected.is_red);
                prop_assert_eq!(node.left.map(|r| r.index()), expected.left);
                prop_assert_eq!(node.right.map(|r| r.index()), expected.right);
                prop_assert_eq!(node.parent.map(|r| r.index()), expected.parent);
                prop_assert_eq!(node.size, expected.size);
                prop_assert_eq!(node.depth, expected.depth);
                prop_assert_eq!(node.height, expected.height);
                prop_assert_eq!(node.black_depth, expected.black_depth);
                prop_assert_eq!(node.black_height, expected.black_height);
                prop_assert_eq!(node.are_black_paths_equal, expected.are_black_paths_equal);
                prop_assert_eq!(node.parent_diverges(), expected.parent_diverges);
                prop_assert_eq!(node.left_diverges(), expected.left_diverges);
                prop_assert_eq!(node.right_diverges(), expected.right_diverges);
                prop_assert_eq!(&node.debug, &expected.debug);
                prop_assert_eq!(&node.error, &expected.error);
                prop_assert_eq!(&node.subtree_error, &expected.subtree_error);
                prop_assert_eq!(node.has_error, expected.has_error);
                prop_assert_eq!(node.subtree_has_error, expected.subtree_has_error);
            }
        }
    }

    #[test]
    fn root_summarizes_every_error((tree, start) in pointer_graph()) {
        let snapshot = load(&export_validated(&tree, start, &tree).unwrap()).unwrap();
        let any_error = snapshot.nodes.iter().any(|node| node.has_error);
        prop_assert_eq!(snapshot.has_errors(), any_error);
    }

    #[test]
    fn export_is_deterministic((tree, start) in pointer_graph()) {
        prop_assert_eq!(export_plain(&tree, start).unwrap(), export_plain(&tree, start).unwrap());
    }

    #[test]
    fn every_start_in_a_tree_gives_same_tree((tree, start) in balanced_tree(64)) {
        let from_start = sanitize(&tree, start).unwrap();
        prop_assert_eq!(from_start.divergence_count(), 0);

        let root = from_start.root_handle();
        let from_root = sanitize(&tree, root).unwrap();
        prop_assert_eq!(from_start.nodes(), from_root.nodes());
    }

    #[test]
    fn valid_trees_load_without_errors((tree, start) in balanced_tree(128)) {
        let snapshot = load(&export_validated(&tree, start, &tree).unwrap()).unwrap();
        prop_assert!(!snapshot.has_errors());
        prop_assert_eq!(snapshot.len() + 1, tree.slot_count());
        prop_assert!(snapshot.nodes.iter().all(|node| node.are_black_paths_equal));
    }
}
