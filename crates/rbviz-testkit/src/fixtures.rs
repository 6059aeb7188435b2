//! Reference scenarios.
//!
//! Each fixture is a small node graph plus the node to export it from. The
//! graphs cover valid trees, broken color rules, broken pointers, failing
//! validation hooks and malformed leaves.

use crate::tree::{NodeRef, TestTree};

/// A node graph and the node an export starts from.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub tree: TestTree,
    pub start: NodeRef,
}

impl Scenario {
    fn new(name: &'static str, tree: TestTree, start: NodeRef) -> Self {
        Self { name, tree, start }
    }
}

/// A single black node.
pub fn single_node() -> Scenario {
    let mut tree = TestTree::new();
    let node = tree.add(7);
    Scenario::new("single node", tree, node)
}

/// A black node with a red left child, exported from the child.
pub fn two_nodes() -> Scenario {
    let mut tree = TestTree::new();
    let top = tree.add(7);
    let child = tree.add(6);
    tree.link_left(top, child);
    tree.set_red(child, true);
    tree.augment(top);
    Scenario::new("two nodes", tree, child)
}

/// A lone red node.
pub fn red_root() -> Scenario {
    let mut tree = TestTree::new();
    let node = tree.add(0);
    tree.set_red(node, true);
    Scenario::new("red root", tree, node)
}

/// Black root, red left child, red grandchild on the child's right.
pub fn red_red() -> Scenario {
    let mut tree = TestTree::new();
    let top = tree.add(0);
    let child = tree.add(0);
    let grandchild = tree.add(0);
    tree.link_left(top, child);
    tree.link_right(child, grandchild);
    tree.set_red(child, true);
    tree.set_red(grandchild, true);
    Scenario::new("red-red", tree, grandchild)
}

/// Two black nodes: one path has two black nodes, the other one.
pub fn unequal_black_paths() -> Scenario {
    let mut tree = TestTree::new();
    let top = tree.add(0);
    let child = tree.add(0);
    tree.link_left(top, child);
    Scenario::new("unequal black paths", tree, top)
}

/// A node that is its own right child.
pub fn self_right() -> Scenario {
    let mut tree = TestTree::new();
    let node = tree.add(0);
    tree.node_mut(node).right = Some(node);
    Scenario::new("self right", tree, node)
}

/// A node that is its own parent.
pub fn self_parent() -> Scenario {
    let mut tree = TestTree::new();
    let node = tree.add(0);
    tree.node_mut(node).parent = Some(node);
    Scenario::new("self parent", tree, node)
}

/// A red node that is the right child of one node and the left child of
/// another, exported from the shared node.
pub fn shared_child() -> Scenario {
    let mut tree = TestTree::new();
    let top = tree.add(0);
    let left = tree.add(0);
    let right = tree.add(0);
    let shared = tree.add(0);
    tree.link_left(top, left);
    tree.link_right(top, right);
    tree.link_right(left, shared);
    tree.node_mut(right).left = Some(shared);
    tree.set_red(shared, true);
    Scenario::new("shared child", tree, shared)
}

/// Two nodes whose parent pointers name each other.
pub fn mutual_parents() -> Scenario {
    let mut tree = TestTree::new();
    let a = tree.add(0);
    let b = tree.add(0);
    tree.node_mut(a).parent = Some(b);
    tree.node_mut(b).parent = Some(a);
    Scenario::new("mutual parents", tree, a)
}

/// `a.right = b` and `b.left = a`, with `b` red and `a` parentless.
pub fn mutual_children() -> Scenario {
    let mut tree = TestTree::new();
    let a = tree.add(0);
    let b = tree.add(0);
    tree.link_right(a, b);
    tree.node_mut(b).left = Some(a);
    tree.set_red(b, true);
    Scenario::new("mutual children", tree, a)
}

/// A valid two-node tree whose root stores the wrong sum.
pub fn wrong_sum() -> Scenario {
    let mut tree = TestTree::new();
    let top = tree.add(18);
    let child = tree.add(42);
    tree.link_right(top, child);
    tree.set_red(child, true);
    tree.set_sum(top, -60);
    Scenario::new("wrong sum", tree, top)
}

/// A valid two-node tree with correct sums but values out of order.
pub fn order_violation() -> Scenario {
    let mut tree = TestTree::new();
    let top = tree.add(25);
    let child = tree.add(36);
    tree.link_left(top, child);
    tree.set_red(child, true);
    tree.augment(top);
    Scenario::new("order violation", tree, top)
}

/// A root whose right child has no right pointer, so it counts as a leaf.
pub fn missing_child_pointer() -> Scenario {
    let mut tree = TestTree::new();
    let top = tree.add(0);
    let child = tree.add(0);
    let grandchild = tree.add(0);
    tree.link_right(top, child);
    tree.link_left(child, grandchild);
    tree.node_mut(child).right = None;
    Scenario::new("missing child pointer", tree, top)
}

/// A node with no child pointers at all.
pub fn detached_node() -> Scenario {
    let mut tree = TestTree::new();
    let node = tree.add_detached(0);
    Scenario::new("detached node", tree, node)
}

/// A balanced, correctly colored tree holding `0..size`, exported from
/// the smallest value.
pub fn large(size: usize) -> Scenario {
    let values: Vec<i64> = (0..size as i64).collect();
    let (tree, _root) = TestTree::balanced(&values);
    Scenario::new("large", tree, NodeRef(1))
}

/// Every small scenario.
pub fn all_scenarios() -> Vec<Scenario> {
    vec![
        single_node(),
        two_nodes(),
        red_root(),
        red_red(),
        unequal_black_paths(),
        self_right(),
        self_parent(),
        shared_child(),
        mutual_parents(),
        mutual_children(),
        wrong_sum(),
        order_violation(),
        missing_child_pointer(),
        detached_node(),
    ]
}

/// Debug text with control and non-ASCII characters, or none for value 14.
pub fn awkward_debug_string(tree: &TestTree, node: NodeRef) -> Option<String> {
    if tree.node(node).value == 14 {
        None
    } else {
        Some("Foo\n\t\r\\ \u{1234}\u{2345}".to_string())
    }
}
