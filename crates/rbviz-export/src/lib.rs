//! # rbviz Export
//!
//! The producer half of rbviz. Given any node of an in-memory red-black
//! tree that may be malformed (cyclic, sharing nodes, or breaking its own
//! color rules), it builds a canonical binary tree, runs the tree
//! library's validation hooks without letting them abort the walk, and
//! encodes the result as wire text.
//!
//! ## Pipeline
//!
//! ```text
//! node graph -> sanitize -> validate -> encode -> JSON text
//! ```
//!
//! - [`sanitize`] - Root discovery and visited-set guarded canonicalization
//! - [`validate`] - Red-black invariant check plus the external hooks
//! - [`encode`] - Nested wire records carrying only the anomalies
//!
//! The source graph is only read, never repaired.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rbviz_export::{export, ExportOptions, NoDebugStrings, NoValidation};
//!
//! let text = export(&tree, node, &ExportOptions::default(), &NoValidation, &NoDebugStrings)?;
//! ```

pub mod encode;
pub mod error;
pub mod export;
pub mod graph;
pub mod sanitize;
pub mod validate;

pub use encode::{encode_tree, DebugStrings, NoDebugStrings};
pub use error::{ExportError, Result};
pub use export::{
    export, export_document, export_plain, export_titled, export_validated, ExportOptions,
};
pub use graph::RedBlackGraph;
pub use sanitize::{find_root, sanitize, CanonicalNode, CanonicalTree, Divergence, RootDiscovery};
pub use validate::{
    check_red_black, validate_tree, InvariantViolation, NoValidation, ValidationFailure,
    ValidationReport, Validator,
};
