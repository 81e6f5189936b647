//! labrig-param-schema - Typed parameter schema for measurement procedures
//!
//! This crate is the typed layer of the labrig parameter engine. Parameter
//! trees are classified once into [`Node`]s (leaf descriptor, branch, or raw
//! pass-through value), and every operation dispatches on that kind instead
//! of re-testing mapping shapes during traversal. The canonical catalog of
//! procedures lives in [`catalog`], and [`record`] reads and writes the flat
//! JSON run records stored next to measurement data.
//!
//! ```
//! use labrig_param_schema::catalog;
//!
//! let defaults = catalog::defaults();
//! assert_eq!(defaults["runConfigs"]["GateSweep"]["gateVoltageMinimum"], -1.0);
//!
//! let essentials = catalog::essentials();
//! assert!(essentials.get_path("runConfigs.GateSweep.gateVoltageMinimum").is_some());
//! ```

pub mod catalog;
mod convert;
pub mod node;
mod ops;
pub mod record;

// Re-exports for convenience
pub use node::{Children, Leaf, Node, ParamType};
pub use record::{RecordError, RunRecord, PARAMETERS_FORMAT_VERSION};
