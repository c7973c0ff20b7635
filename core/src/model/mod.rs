//! The hierarchical model edited by commands.
//!
//! - [`ModelRoot`] - arena of elements with O(1) id lookup
//! - [`Element`] / [`ElementId`] - tree nodes and their identifiers
//! - [`Features`] - capability flags commands check before mutating
//! - [`RoutingHandle`] / [`HandleKind`] - data of routing-handle elements
//! - [`GraphBuilder`] - fluent construction of node/edge graphs

mod builder;
mod element;
mod root;

pub use builder::GraphBuilder;
pub use element::{Element, ElementId, Features, HandleKind, RoutingHandle};
pub use root::{ModelError, ModelRoot};
