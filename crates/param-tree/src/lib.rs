//! labrig-param-tree - Parameter tree primitives for measurement configuration
//!
//! This crate provides the untyped layer of the labrig parameter engine: pure
//! functions over `serde_json::Value` trees that extract default values from a
//! parameter schema, deep-merge override layers, hydrate a schema from plain
//! values, and filter a schema down to marked subtrees.
//!
//! A parameter schema is an ordinary JSON object. Any sub-object that carries
//! a `default` key is a leaf descriptor; every other object is a branch whose
//! entries are child parameters. Leaf descriptors hold metadata next to the
//! default (`type`, `units`, `essential`, ...), and the functions here are
//! careful to keep that metadata intact while values flow through.

pub mod defaults;
pub mod filter;
pub mod merge;

// Re-exports for convenience
pub use defaults::{extract_defaults, intersection_defaults, merge_defaults, DEFAULT_KEY, IGNORE_KEY};
pub use filter::{eventually_includes, must_include};
pub use merge::{merge, merge_layers};
