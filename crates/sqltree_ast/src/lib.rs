//! sqltree_ast: Syntax tree definitions for the sqltree query parser.
//!
//! This crate defines the closed set of node kinds produced by the raw
//! parser, the read-only [`walk`] and copy-producing [`mutate`] traversals
//! that cover every kind, and [`expr_location`] for recovering source
//! positions.

pub mod generated;
pub mod location;
pub mod mutator;
pub mod node;
pub mod types;
pub mod walker;

// Re-export key types
pub use generated::{Node, NodePayload, NodeTag};
pub use location::{expr_location, leftmost_location};
pub use mutator::{mutate, mutate_children, NodeTransformer};
pub use node::*;
pub use types::*;
pub use walker::{collect_nodes, walk, walk_children, walk_list, NodeVisitor};
