//! Validator bridge: the red-black invariant check and the external hooks.
//!
//! The tree library may supply per-node and whole-subtree checks. Their
//! failures (returned or panicked) are captured as text and never stop the
//! walk. Both hooks assume a structurally sound red-black tree, so they
//! only run after an independent invariant check has passed.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use rbviz_core::Rank;
use thiserror::Error;
use tracing::{debug, warn};

use crate::graph::RedBlackGraph;
use crate::sanitize::CanonicalTree;

/// A failure reported by an external validation hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Short kind label, e.g. the name of the failing check.
    pub label: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.message)
    }
}

/// Validation capability supplied by the tree library.
///
/// Both checks default to passing. Implementations may return an error or
/// panic; either way the failure is recorded as text on the snapshot.
pub trait Validator<G: RedBlackGraph + ?Sized> {
    /// Check the fields of a single node (e.g. an augmented value).
    fn check_node(&self, _graph: &G, _node: G::Node) -> Result<(), ValidationFailure> {
        Ok(())
    }

    /// Check the subtree rooted at `root` as a whole (e.g. key ordering).
    ///
    /// Only called on a tree that already satisfies the red-black invariants.
    fn check_subtree(&self, _graph: &G, _root: G::Node) -> Result<(), ValidationFailure> {
        Ok(())
    }
}

/// A validator with no checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl<G: RedBlackGraph + ?Sized> Validator<G> for NoValidation {}

/// Why a canonical tree is not believed to be a valid red-black tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("root has a parent pointer")]
    RootHasParent,

    #[error("node {0} has pointers that diverge from the canonical tree")]
    Divergent(Rank),

    #[error("root is red")]
    RedRoot,

    #[error("red node {0} has a red parent")]
    RedRed(Rank),

    #[error("black heights differ below node {rank}: left {left}, right {right}")]
    UnequalBlackHeight { rank: Rank, left: u32, right: u32 },
}

/// Check the red-black invariants over the canonical tree without any hook.
///
/// Requires a parentless root, no divergent pointers, a black root, no red
/// node with a red parent, and equal black counts on every root-to-boundary
/// path.
pub fn check_red_black<G: RedBlackGraph>(
    graph: &G,
    tree: &CanonicalTree<G::Node>,
) -> Result<(), InvariantViolation> {
    if graph.parent(tree.root_handle()).is_some() {
        return Err(InvariantViolation::RootHasParent);
    }
    if let Some((rank, _)) = tree.divergences().next() {
        return Err(InvariantViolation::Divergent(rank));
    }
    if graph.is_red(tree.root_handle()) {
        return Err(InvariantViolation::RedRoot);
    }

    let order = tree.breadth_first();
    for &rank in &order {
        let node = tree.node(rank);
        if let Some(parent) = node.parent {
            if graph.is_red(node.handle) && graph.is_red(tree.node(parent).handle) {
                return Err(InvariantViolation::RedRed(rank));
            }
        }
    }

    // Children before parents
    let mut black_height = vec![0u32; tree.len()];
    for &rank in order.iter().rev() {
        let node = tree.node(rank);
        let left = node.left.map_or(0, |child| black_height[child.index()]);
        let right = node.right.map_or(0, |child| black_height[child.index()]);
        if left != right {
            return Err(InvariantViolation::UnequalBlackHeight { rank, left, right });
        }
        black_height[rank.index()] = left + u32::from(!graph.is_red(node.handle));
    }
    Ok(())
}

/// Everything the validator bridge learned about one tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Result of the independent invariant check.
    pub red_black: Result<(), InvariantViolation>,
    /// Per-node hook failures, indexed by rank.
    pub node_errors: Vec<Option<String>>,
    /// Whole-subtree hook failure at the canonical root.
    pub subtree_error: Option<String>,
}

impl ValidationReport {
    pub fn is_valid_red_black(&self) -> bool {
        self.red_black.is_ok()
    }

    pub fn node_error(&self, rank: Rank) -> Option<&str> {
        self.node_errors.get(rank.index()).and_then(|e| e.as_deref())
    }
}

/// Run the invariant check and, when it passes, the external hooks.
pub fn validate_tree<G, V>(graph: &G, tree: &CanonicalTree<G::Node>, validator: &V) -> ValidationReport
where
    G: RedBlackGraph,
    V: Validator<G> + ?Sized,
{
    let red_black = check_red_black(graph, tree);
    let mut node_errors = vec![None; tree.len()];
    let mut subtree_error = None;

    match &red_black {
        Ok(()) => {
            for (index, node) in tree.nodes().iter().enumerate() {
                node_errors[index] = run_hook(|| validator.check_node(graph, node.handle));
            }
            subtree_error = run_hook(|| validator.check_subtree(graph, tree.root_handle()));
        }
        Err(violation) => {
            debug!(%violation, "skipping validation hooks");
        }
    }

    ValidationReport {
        red_black,
        node_errors,
        subtree_error,
    }
}

/// Invoke a hook, converting an error or a panic into display text.
fn run_hook<F>(hook: F) -> Option<String>
where
    F: FnOnce() -> Result<(), ValidationFailure>,
{
    match panic::catch_unwind(AssertUnwindSafe(hook)) {
        Ok(Ok(())) => None,
        Ok(Err(failure)) => Some(failure.to_string()),
        Err(payload) => {
            let failure = ValidationFailure::new("panic", panic_message(payload.as_ref()));
            warn!(%failure, "validation hook panicked");
            Some(failure.to_string())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::arena::Arena;
    use crate::sanitize::sanitize;

    /// b(a, c) with red leaves.
    fn valid_tree() -> (Arena, usize) {
        let mut arena = Arena::new();
        let a = arena.add(true);
        let b = arena.add(false);
        let c = arena.add(true);
        arena.link_left(b, a);
        arena.link_right(b, c);
        (arena, b)
    }

    /// Rejects node 3 and every subtree.
    struct Picky;

    impl Validator<Arena> for Picky {
        fn check_node(&self, _graph: &Arena, node: usize) -> Result<(), ValidationFailure> {
            if node == 3 {
                Err(ValidationFailure::new("RuntimeException", "sum is wrong"))
            } else {
                Ok(())
            }
        }

        fn check_subtree(&self, _graph: &Arena, _root: usize) -> Result<(), ValidationFailure> {
            Err(ValidationFailure::new("RuntimeException", "order is wrong"))
        }
    }

    struct Panicky;

    impl Validator<Arena> for Panicky {
        fn check_node(&self, _graph: &Arena, node: usize) -> Result<(), ValidationFailure> {
            assert!(node != 1, "node {} is bad", node);
            Ok(())
        }
    }

    #[test]
    fn test_valid_tree_passes() {
        let (arena, root) = valid_tree();
        let tree = sanitize(&arena, root).unwrap();
        assert_eq!(check_red_black(&arena, &tree), Ok(()));
    }

    #[test]
    fn test_red_root() {
        let (mut arena, root) = valid_tree();
        arena.slots[root].red = true;
        let tree = sanitize(&arena, root).unwrap();
        assert_eq!(check_red_black(&arena, &tree), Err(InvariantViolation::RedRoot));
    }

    #[test]
    fn test_red_red() {
        let (mut arena, root) = valid_tree();
        let d = arena.add(true);
        arena.link_right(3, d);
        let tree = sanitize(&arena, root).unwrap();
        assert_eq!(
            check_red_black(&arena, &tree),
            Err(InvariantViolation::RedRed(Rank(3)))
        );
    }

    #[test]
    fn test_unequal_black_height() {
        let (mut arena, root) = valid_tree();
        arena.slots[1].red = false;
        let tree = sanitize(&arena, root).unwrap();
        assert_eq!(
            check_red_black(&arena, &tree),
            Err(InvariantViolation::UnequalBlackHeight {
                rank: Rank(1),
                left: 1,
                right: 0
            })
        );
    }

    #[test]
    fn test_divergent_tree_is_not_trusted() {
        let (mut arena, root) = valid_tree();
        arena.slots[1].parent = None;
        let tree = sanitize(&arena, root).unwrap();
        assert_eq!(
            check_red_black(&arena, &tree),
            Err(InvariantViolation::Divergent(Rank(0)))
        );
    }

    #[test]
    fn test_hook_failures_are_captured() {
        let (arena, root) = valid_tree();
        let tree = sanitize(&arena, root).unwrap();
        let report = validate_tree(&arena, &tree, &Picky);

        assert!(report.is_valid_red_black());
        assert_eq!(report.node_error(Rank(0)), None);
        assert_eq!(report.node_error(Rank(2)), Some("RuntimeException: sum is wrong"));
        assert_eq!(
            report.subtree_error.as_deref(),
            Some("RuntimeException: order is wrong")
        );
    }

    #[test]
    fn test_hooks_skipped_on_invalid_tree() {
        let (mut arena, root) = valid_tree();
        arena.slots[root].red = true;
        let tree = sanitize(&arena, root).unwrap();
        let report = validate_tree(&arena, &tree, &Picky);

        assert!(!report.is_valid_red_black());
        assert!(report.node_errors.iter().all(Option::is_none));
        assert_eq!(report.subtree_error, None);
    }

    #[test]
    fn test_panicking_hook_is_captured() {
        let (arena, root) = valid_tree();
        let tree = sanitize(&arena, root).unwrap();
        let report = validate_tree(&arena, &tree, &Panicky);

        assert_eq!(report.node_error(Rank(0)), Some("panic: node 1 is bad"));
        assert_eq!(report.node_error(Rank(1)), None);
    }

    #[test]
    fn test_no_validation() {
        let (arena, root) = valid_tree();
        let tree = sanitize(&arena, root).unwrap();
        let report = validate_tree(&arena, &tree, &NoValidation);
        assert!(report.node_errors.iter().all(Option::is_none));
        assert_eq!(report.subtree_error, None);
    }
}
