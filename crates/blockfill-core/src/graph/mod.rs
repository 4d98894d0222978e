//! Dependency graphs with incrementally maintained ancestor and descendant
//! closures.

pub mod dyn_graph;
pub mod tx_graph;

pub use dyn_graph::DynGraph;
pub use tx_graph::TxGraph;
