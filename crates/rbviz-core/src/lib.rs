//! # rbviz Core
//!
//! Shared vocabulary for exporting and viewing possibly-malformed red-black
//! trees: ranks, pointer divergence tags, and the nested wire records.
//!
//! This crate contains no traversal logic. The producer (`rbviz-export`)
//! and the consumer (`rbviz-view`) both speak the types defined here.
//!
//! ## Key Types
//!
//! - [`Rank`] - In-order position of a node in the canonical tree
//! - [`ParentLink`] / [`ChildLink`] - How a raw pointer diverges from canonical structure
//! - [`WireDocument`] / [`WireNode`] - The serialized snapshot
//!
//! ## Wire Format
//!
//! Snapshots are compact JSON. Canonical structure is carried purely by
//! nesting, so only anomalies need explicit fields. See [`wire`].

pub mod error;
pub mod types;
pub mod wire;

pub use error::WireError;
pub use types::{ChildLink, ParentLink, Rank};
pub use wire::{from_json, to_json, WireChild, WireDocument, WireNode};
