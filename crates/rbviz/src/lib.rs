//! # rbviz
//!
//! The unified API for exporting red-black trees from a running program
//! and viewing them, including trees that a bug has left malformed.
//!
//! ## Overview
//!
//! - **Export**: Walk the node graph reachable from any node, settle it into
//!   a canonical tree, validate it, and serialize it as a compact snapshot
//! - **View**: Decode a snapshot, recover the raw pointers, and derive
//!   per-node metadata and error flags for rendering
//! - **Sessions**: Open external viewers, never more than a fixed number at once
//!
//! ## Key Concepts
//!
//! - **Canonical tree**: The tree a careful in-order walk reaches. Every
//!   node appears once, whatever the raw pointers say.
//! - **Divergence**: A raw pointer that disagrees with the canonical tree.
//!   Divergences are written into the snapshot, never repaired.
//! - **Rank**: A node's in-order position, which is also its identity in
//!   the snapshot.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rbviz::{NoDebugStrings, NoValidation, RedBlackGraph, Visualizer};
//!
//! fn example<G: RedBlackGraph>(graph: &G, node: G::Node) {
//!     let visualizer = Visualizer::default();
//!
//!     // Capture the tree containing `node`
//!     let wire = visualizer
//!         .export(graph, node, &NoValidation, &NoDebugStrings)
//!         .unwrap();
//!
//!     // Decode it the way a viewer would
//!     let snapshot = visualizer.load(&wire).unwrap();
//!     if snapshot.has_errors() {
//!         println!("tree has {} nodes and is broken", snapshot.len());
//!     }
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `rbviz::core` - Wire format and shared vocabulary (Rank, links)
//! - `rbviz::export` - Graph interface, sanitizer, validator bridge, encoder
//! - `rbviz::view` - Decoder and metadata deriver

pub mod error;
pub mod session;
pub mod visualizer;

// Re-export component crates
pub use rbviz_core as core;
pub use rbviz_export as export;
pub use rbviz_view as view;

// Re-export main types for convenience
pub use error::{Result, ViewerError, VisualizerError};
pub use session::{SessionId, SessionRegistry, Viewer};
pub use visualizer::{Visualizer, VisualizerConfig};

// Re-export commonly used component types
pub use rbviz_core::{Rank, WireDocument};
pub use rbviz_export::{
    DebugStrings, ExportOptions, NoDebugStrings, NoValidation, RedBlackGraph, ValidationFailure,
    Validator,
};
pub use rbviz_view::{DecodedNode, PointerStatus, Snapshot};
