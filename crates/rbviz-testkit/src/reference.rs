//! A straightforward recursive model of what a viewer should show.
//!
//! It computes the canonical tree and every derived field directly from a
//! [`TestTree`], without going through the wire format, so tests can check
//! the export-then-load pipeline against it. Error flags come from the
//! tree's own validation hooks and debug text from [`value_and_sum`], so
//! compare against an export made with both. Recursion keeps it simple; use
//! it only on small or balanced graphs.

use std::collections::HashSet;

use rbviz_export::{RedBlackGraph, Validator};

use crate::tree::{value_and_sum, NodeRef, TestTree};

/// Expected view of one node, indexed by in-order rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceNode {
    pub handle: NodeRef,
    pub is_red: bool,
    pub debug: Option<String>,
    pub error: Option<String>,
    /// Set on the root only.
    pub subtree_error: Option<String>,
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub parent: Option<usize>,
    pub size: u32,
    pub depth: u32,
    pub height: u32,
    pub black_depth: u32,
    pub black_height: u32,
    pub are_black_paths_equal: bool,
    pub parent_diverges: bool,
    pub left_diverges: bool,
    pub right_diverges: bool,
    pub has_error: bool,
    pub subtree_has_error: bool,
}

/// Expected canonical tree of a [`TestTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTree {
    pub root: usize,
    pub nodes: Vec<ReferenceNode>,
}

impl ReferenceTree {
    /// Rank of `handle`, when it is in the tree.
    pub fn rank_of(&self, handle: NodeRef) -> Option<usize> {
        self.nodes.iter().position(|node| node.handle == handle)
    }
}

/// Compute the expected canonical tree containing `start`.
///
/// Returns `None` when `start` is itself a leaf.
pub fn reference_tree(tree: &TestTree, start: NodeRef) -> Option<ReferenceTree> {
    if tree.is_leaf(start) {
        return None;
    }

    let mut chain = vec![start];
    let root = loop {
        let current = chain[chain.len() - 1];
        match tree.parent(current) {
            Some(parent) if !tree.is_leaf(parent) => {
                if chain.contains(&parent) {
                    break parent;
                }
                chain.push(parent);
            }
            _ => break current,
        }
    };

    let mut walk = Walk {
        tree,
        visited: HashSet::from([root]),
        nodes: Vec::new(),
    };
    let root = walk.visit(root, 0, 0);
    let mut nodes = walk.nodes;

    for rank in 0..nodes.len() {
        let handle = nodes[rank].handle;
        let canonical_parent = nodes[rank].parent.map(|parent| nodes[parent].handle);
        let left = nodes[rank].left;
        let right = nodes[rank].right;
        let node = &mut nodes[rank];
        node.parent_diverges = tree.parent(handle) != canonical_parent;
        node.left_diverges = left.is_none() && !tree.is_boundary(tree.left(handle));
        node.right_diverges = right.is_none() && !tree.is_boundary(tree.right(handle));
    }

    // Hooks only run on a structurally sound red-black tree
    let sound = !nodes[root].is_red
        && nodes[root].are_black_paths_equal
        && nodes.iter().all(|node| {
            !node.parent_diverges
                && !node.left_diverges
                && !node.right_diverges
                && !(node.is_red && node.parent.is_some_and(|parent| nodes[parent].is_red))
        });

    for rank in 0..nodes.len() {
        let handle = nodes[rank].handle;
        let error = sound
            .then(|| tree.check_node(tree, handle).err())
            .flatten()
            .map(|failure| failure.to_string());
        let red_violation =
            nodes[rank].is_red && nodes[rank].parent.map_or(true, |parent| nodes[parent].is_red);
        let unequal_black_paths = rank == root && !nodes[rank].are_black_paths_equal;

        let node = &mut nodes[rank];
        node.debug = value_and_sum(tree, handle);
        node.has_error = node.parent_diverges
            || node.left_diverges
            || node.right_diverges
            || red_violation
            || unequal_black_paths
            || error.is_some();
        node.error = error;
    }
    mark_subtrees(&mut nodes, root);

    let subtree_error = sound
        .then(|| tree.check_subtree(tree, nodes[root].handle).err())
        .flatten()
        .map(|failure| failure.to_string());
    let top = &mut nodes[root];
    if subtree_error.is_some() && !top.subtree_has_error {
        top.has_error = true;
        top.subtree_has_error = true;
    }
    top.subtree_error = subtree_error;

    Some(ReferenceTree { root, nodes })
}

/// Set `subtree_has_error` below and at `rank`; returns the flag.
fn mark_subtrees(nodes: &mut [ReferenceNode], rank: usize) -> bool {
    let mut flagged = nodes[rank].has_error;
    for child in [nodes[rank].left, nodes[rank].right].into_iter().flatten() {
        flagged |= mark_subtrees(nodes, child);
    }
    nodes[rank].subtree_has_error = flagged;
    flagged
}

struct Walk<'a> {
    tree: &'a TestTree,
    visited: HashSet<NodeRef>,
    nodes: Vec<ReferenceNode>,
}

impl Walk<'_> {
    fn claim(&mut self, child: Option<NodeRef>) -> Option<NodeRef> {
        let child = child?;
        if self.tree.is_leaf(child) || !self.visited.insert(child) {
            return None;
        }
        Some(child)
    }

    fn visit(&mut self, handle: NodeRef, depth: u32, parent_black_depth: u32) -> usize {
        let is_red = self.tree.is_red(handle);
        let black_depth = parent_black_depth + u32::from(!is_red);

        let left = self
            .claim(self.tree.left(handle))
            .map(|child| self.visit(child, depth + 1, black_depth));

        let rank = self.nodes.len();
        self.nodes.push(ReferenceNode {
            handle,
            is_red,
            debug: None,
            error: None,
            subtree_error: None,
            left,
            right: None,
            parent: None,
            size: 0,
            depth,
            height: 0,
            black_depth,
            black_height: 0,
            are_black_paths_equal: false,
            parent_diverges: false,
            left_diverges: false,
            right_diverges: false,
            has_error: false,
            subtree_has_error: false,
        });

        let right = self
            .claim(self.tree.right(handle))
            .map(|child| self.visit(child, depth + 1, black_depth));

        let children: Vec<&ReferenceNode> =
            [left, right].into_iter().flatten().map(|child| &self.nodes[child]).collect();
        let size = 1 + children.iter().map(|child| child.size).sum::<u32>();
        let height = children.iter().map(|child| child.height + 1).max().unwrap_or(0);
        let left_black = left.map_or(0, |child| self.nodes[child].black_height);
        let right_black = right.map_or(0, |child| self.nodes[child].black_height);
        let are_black_paths_equal = children.iter().all(|child| child.are_black_paths_equal)
            && left_black == right_black;

        for child in [left, right].into_iter().flatten() {
            self.nodes[child].parent = Some(rank);
        }
        let node = &mut self.nodes[rank];
        node.right = right;
        node.size = size;
        node.height = height;
        node.black_height = u32::from(!is_red) + left_black.max(right_black);
        node.are_black_paths_equal = are_black_paths_equal;
        rank
    }
}
