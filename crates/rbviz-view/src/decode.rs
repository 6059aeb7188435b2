//! Decoder: wire text back into a node table.
//!
//! Nesting is read in one in-order pass over an explicit stack, so ranks
//! come out exactly as the exporter assigned them and chain depth costs no
//! call stack. A second pass resolves the divergence fields,
//! which may name any rank in the tree, into raw pointer relationships.

use rbviz_core::{from_json, ChildLink, ParentLink, Rank, WireChild, WireDocument, WireNode};
use tracing::debug;

use crate::error::Result;
use crate::snapshot::{DecodedNode, PointerStatus, Snapshot};

/// Parse wire text into a snapshot with unsanitized pointers resolved.
///
/// Metadata is left unset; see [`derive`](crate::derive).
pub fn decode(text: &str) -> Result<Snapshot> {
    let document = from_json(text)?;
    Ok(decode_document(document))
}

/// Build a snapshot from already-parsed wire records.
pub fn decode_document(document: WireDocument) -> Snapshot {
    let WireDocument {
        title,
        selected_node,
        tree,
    } = document;

    let mut builder = Builder::default();
    let root = tree.and_then(|record| builder.build(Box::new(record)));
    let mut nodes = builder.nodes;
    let len = nodes.len();

    for (node, raw) in nodes.iter_mut().zip(builder.raw) {
        resolve_parent(node, raw.parent, len);
        if let Some(value) = raw.left {
            (node.unsanitized_left, node.left_status) = resolve_child(node.id, value, len);
        }
        if let Some(value) = raw.right {
            (node.unsanitized_right, node.right_status) = resolve_child(node.id, value, len);
        }
    }

    let selected = selected_node.and_then(|value| Rank::from_wire(value, len));
    debug!(nodes = len, ?selected, "decoded snapshot");

    Snapshot {
        title,
        selected,
        root,
        nodes,
    }
}

/// Divergence fields held back until the node count is known.
#[derive(Default)]
struct RawLinks {
    parent: Option<Option<i64>>,
    left: Option<i64>,
    right: Option<i64>,
}

#[derive(Default)]
struct Builder {
    nodes: Vec<DecodedNode>,
    raw: Vec<RawLinks>,
}

/// What the record said about its left child.
enum LeftSlot {
    Nested,
    Ref(i64),
    Empty,
}

enum Frame {
    /// Record not yet visited.
    Enter(Box<WireNode>),
    /// Left subtree finished; the record itself gets the next rank.
    Visit { record: Box<WireNode>, left: LeftSlot },
    /// Right subtree finished for the node at this rank.
    Close(Rank),
}

impl Builder {
    /// Append the subtree in in-order and return the rank of its root.
    fn build(&mut self, record: Box<WireNode>) -> Option<Rank> {
        let mut stack = vec![Frame::Enter(record)];
        // Root of the most recently completed subtree
        let mut finished = None;

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(mut record) => match record.left.take() {
                    Some(WireChild::Node(child)) => {
                        stack.push(Frame::Visit {
                            record,
                            left: LeftSlot::Nested,
                        });
                        stack.push(Frame::Enter(child));
                    }
                    Some(WireChild::Ref(value)) => stack.push(Frame::Visit {
                        record,
                        left: LeftSlot::Ref(value),
                    }),
                    None => stack.push(Frame::Visit {
                        record,
                        left: LeftSlot::Empty,
                    }),
                },
                Frame::Visit { mut record, left } => {
                    let rank = match left {
                        LeftSlot::Nested => self.push(&mut record, finished.take(), None),
                        LeftSlot::Ref(value) => self.push(&mut record, None, Some(value)),
                        LeftSlot::Empty => self.push(&mut record, None, None),
                    };
                    match record.right.take() {
                        Some(WireChild::Node(child)) => {
                            stack.push(Frame::Close(rank));
                            stack.push(Frame::Enter(child));
                        }
                        Some(WireChild::Ref(value)) => {
                            self.raw[rank.index()].right = Some(value);
                            finished = Some(rank);
                        }
                        None => finished = Some(rank),
                    }
                }
                Frame::Close(rank) => {
                    if let Some(child) = finished.take() {
                        let node = &mut self.nodes[rank.index()];
                        node.right = Some(child);
                        node.unsanitized_right = Some(child);
                        node.right_status = PointerStatus::Present;
                        self.nodes[child.index()].parent = Some(rank);
                    }
                    finished = Some(rank);
                }
            }
        }
        finished
    }

    /// Give `record` the next rank, linking its finished left subtree.
    fn push(&mut self, record: &mut WireNode, left: Option<Rank>, left_ref: Option<i64>) -> Rank {
        let rank = Rank::from_index(self.nodes.len());
        let mut node = DecodedNode::new(rank, record.is_red);
        node.debug = record.debug.take();
        node.error = record.error.take();
        node.subtree_error = record.subtree_error.take();
        if let Some(child) = left {
            node.left = Some(child);
            node.unsanitized_left = Some(child);
            node.left_status = PointerStatus::Present;
            self.nodes[child.index()].parent = Some(rank);
        }
        self.nodes.push(node);
        self.raw.push(RawLinks {
            parent: record.parent.take(),
            left: left_ref,
            right: None,
        });
        rank
    }
}

fn resolve_parent(node: &mut DecodedNode, value: Option<Option<i64>>, len: usize) {
    let (raw, status) = match ParentLink::from_wire(value, len) {
        ParentLink::Canonical => (node.parent, PointerStatus::Present),
        ParentLink::Absent => (None, PointerStatus::Absent),
        ParentLink::Outside => (None, PointerStatus::Outside),
        ParentLink::Node(rank) if rank == node.id => (Some(rank), PointerStatus::SelfReference),
        // Root discovery only stops on a parented node when the chain loops
        ParentLink::Node(rank) if node.is_root() => (Some(rank), PointerStatus::Cyclic),
        ParentLink::Node(rank) => (Some(rank), PointerStatus::Present),
    };
    node.unsanitized_parent = raw;
    node.parent_status = status;
}

fn resolve_child(id: Rank, value: i64, len: usize) -> (Option<Rank>, PointerStatus) {
    match ChildLink::from_wire(value, len) {
        ChildLink::Node(rank) if rank == id => (Some(rank), PointerStatus::SelfReference),
        ChildLink::Node(rank) => (Some(rank), PointerStatus::Present),
        ChildLink::Canonical | ChildLink::Outside => (None, PointerStatus::Outside),
    }
}
