//! # rbviz Testkit
//!
//! Testing utilities for rbviz.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **TestTree**: An arena node graph with augmented sums and validation hooks
//! - **Fixtures**: Reference scenarios, from valid trees to corrupt pointer graphs
//! - **Reference walk**: An independent model of what a viewer should show
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! ```rust
//! use rbviz_testkit::fixtures::two_nodes;
//!
//! let scenario = two_nodes();
//! let wire = rbviz_export::export_titled(&scenario.tree, scenario.start, "Bar").unwrap();
//! assert_eq!(wire, r#"{"title":"Bar","selectedNode":0,"tree":{"c":false,"l":{"c":true}}}"#);
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use rbviz_testkit::generators::pointer_graph;
//!
//! proptest! {
//!     #[test]
//!     fn export_terminates((tree, start) in pointer_graph()) {
//!         rbviz_export::export_plain(&tree, start).unwrap();
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod reference;
pub mod tree;

pub use fixtures::{all_scenarios, Scenario};
pub use generators::{balanced_tree, pointer_graph};
pub use reference::{reference_tree, ReferenceNode, ReferenceTree};
pub use tree::{value_and_sum, NodeRef, TestNode, TestTree};
