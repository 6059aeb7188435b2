//! Export: the full producer pipeline from a node handle to wire text.

use rbviz_core::{to_json, WireDocument};
use tracing::debug;

use crate::encode::{encode_tree, DebugStrings, NoDebugStrings};
use crate::error::Result;
use crate::graph::RedBlackGraph;
use crate::sanitize::sanitize;
use crate::validate::{validate_tree, NoValidation, Validator};

/// Options for one export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Title shown by the viewer.
    pub title: Option<String>,
    /// Escape everything outside printable ASCII as `\uXXXX`.
    pub escape_non_ascii: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: None,
            escape_non_ascii: true,
        }
    }
}

impl ExportOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// Build the wire document for the tree containing `node`.
///
/// `node` is selected in the snapshot when it appears in the canonical
/// tree. A leaf boundary yields an empty tree.
pub fn export_document<G, V, D>(
    graph: &G,
    node: G::Node,
    title: Option<String>,
    validator: &V,
    debug_strings: &D,
) -> WireDocument
where
    G: RedBlackGraph,
    V: Validator<G> + ?Sized,
    D: DebugStrings<G> + ?Sized,
{
    let Some(tree) = sanitize(graph, node) else {
        return WireDocument {
            title,
            selected_node: None,
            tree: None,
        };
    };

    let report = validate_tree(graph, &tree, validator);
    debug!(
        nodes = tree.len(),
        valid_red_black = report.is_valid_red_black(),
        "exporting tree"
    );

    WireDocument {
        title,
        selected_node: tree.rank_of(node).map(|rank| rank.to_wire()),
        tree: Some(encode_tree(graph, &tree, &report, debug_strings)),
    }
}

/// Export the tree containing `node` as wire text.
///
/// Never fails because of what the tree contains; anomalies and hook
/// failures are written into the snapshot.
pub fn export<G, V, D>(
    graph: &G,
    node: G::Node,
    options: &ExportOptions,
    validator: &V,
    debug_strings: &D,
) -> Result<String>
where
    G: RedBlackGraph,
    V: Validator<G> + ?Sized,
    D: DebugStrings<G> + ?Sized,
{
    let document = export_document(graph, node, options.title.clone(), validator, debug_strings);
    Ok(to_json(&document, options.escape_non_ascii)?)
}

/// Export with default options, no validation hooks and no debug strings.
pub fn export_plain<G: RedBlackGraph>(graph: &G, node: G::Node) -> Result<String> {
    export(graph, node, &ExportOptions::default(), &NoValidation, &NoDebugStrings)
}

/// Export under a title, with no validation hooks and no debug strings.
pub fn export_titled<G: RedBlackGraph>(
    graph: &G,
    node: G::Node,
    title: impl Into<String>,
) -> Result<String> {
    export(graph, node, &ExportOptions::titled(title), &NoValidation, &NoDebugStrings)
}

/// Export with the library's validation hooks but no debug strings.
pub fn export_validated<G, V>(graph: &G, node: G::Node, validator: &V) -> Result<String>
where
    G: RedBlackGraph,
    V: Validator<G> + ?Sized,
{
    export(graph, node, &ExportOptions::default(), validator, &NoDebugStrings)
}
