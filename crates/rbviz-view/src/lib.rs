//! # rbviz View
//!
//! The consumer half of rbviz. It parses a snapshot produced by
//! `rbviz-export`, rebuilds the canonical tree together with the original
//! (unsanitized) pointer relationships, and derives everything a renderer
//! needs: size, depth, height, black depth and height, path balance, and
//! error flags.
//!
//! ## Pipeline
//!
//! ```text
//! JSON text -> decode -> Snapshot -> derive -> annotated Snapshot
//! ```
//!
//! Node ids are in-order ranks, numbered exactly as the exporter numbered
//! them. The annotated [`Snapshot`] is immutable once derived.
//!
//! ## Usage
//!
//! ```rust
//! let snapshot = rbviz_view::load(r#"{"tree":{"c":false,"l":{"c":true}}}"#).unwrap();
//! let root = snapshot.root_node().unwrap();
//! assert_eq!(root.size, 2);
//! assert!(!root.subtree_has_error);
//! ```

pub mod decode;
pub mod derive;
pub mod error;
pub mod snapshot;

pub use decode::{decode, decode_document};
pub use derive::derive;
pub use error::{DecodeError, Result};
pub use snapshot::{DecodedNode, PointerStatus, Snapshot};

/// Decode wire text and derive all metadata in one step.
pub fn load(text: &str) -> Result<Snapshot> {
    let mut snapshot = decode(text)?;
    derive(&mut snapshot);
    Ok(snapshot)
}
