//! Metadata deriver.
//!
//! Depth values flow from the root down; size, height, black height, path
//! balance and error flags flow from the leaves up. Nodes are visited in
//! breadth-first order for the first phase and in reverse for the second,
//! which gives every node its parent's values (respectively its children's)
//! before it needs them, without recursing on deep trees.

use tracing::debug;

use crate::snapshot::Snapshot;

/// Compute all metadata fields of `snapshot` in place.
pub fn derive(snapshot: &mut Snapshot) {
    let Some(root) = snapshot.root else {
        return;
    };
    let order = snapshot.breadth_first();
    let nodes = &mut snapshot.nodes;

    for &id in &order {
        let own_black = u32::from(!nodes[id.index()].is_red);
        let (depth, black_depth) = match nodes[id.index()].parent {
            Some(parent) => {
                let parent = &nodes[parent.index()];
                (parent.depth + 1, parent.black_depth + own_black)
            }
            None => (0, own_black),
        };
        let node = &mut nodes[id.index()];
        node.depth = depth;
        node.black_depth = black_depth;
    }

    for &id in order.iter().rev() {
        let node = &nodes[id.index()];
        let left = node.left.map(|child| &nodes[child.index()]);
        let right = node.right.map(|child| &nodes[child.index()]);

        let size = 1 + left.map_or(0, |c| c.size) + right.map_or(0, |c| c.size);
        let height = match (left, right) {
            (None, None) => 0,
            _ => 1 + left.map_or(0, |c| c.height).max(right.map_or(0, |c| c.height)),
        };
        let left_black = left.map_or(0, |c| c.black_height);
        let right_black = right.map_or(0, |c| c.black_height);
        let black_height = u32::from(!node.is_red) + left_black.max(right_black);
        let are_black_paths_equal = left.map_or(true, |c| c.are_black_paths_equal)
            && right.map_or(true, |c| c.are_black_paths_equal)
            && left_black == right_black;

        let parent_is_red = node.parent.map_or(false, |parent| nodes[parent.index()].is_red);
        let red_violation = node.is_red && (node.is_root() || parent_is_red);
        let has_error = node.parent_diverges()
            || node.left_diverges()
            || node.right_diverges()
            || red_violation
            || (node.is_root() && !are_black_paths_equal)
            || node.error.is_some();
        let subtree_has_error = has_error
            || left.map_or(false, |c| c.subtree_has_error)
            || right.map_or(false, |c| c.subtree_has_error);

        let node = &mut nodes[id.index()];
        node.size = size;
        node.height = height;
        node.black_height = black_height;
        node.are_black_paths_equal = are_black_paths_equal;
        node.has_error = has_error;
        node.subtree_has_error = subtree_has_error;
    }

    // A subtree error is only trusted when nothing more specific explains a failure
    let root = &mut nodes[root.index()];
    if root.subtree_error.is_some() && !root.subtree_has_error {
        root.has_error = true;
        root.subtree_has_error = true;
    }

    debug!(
        nodes = nodes.len(),
        errors = nodes.iter().filter(|node| node.has_error).count(),
        "derived snapshot metadata"
    );
}
