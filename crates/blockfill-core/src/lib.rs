#![forbid(unsafe_code)]
//! blockfill-core library.
//!
//! Ancestor-set greedy block building over a pool of interdependent
//! transactions.
//!
//! # Layers
//!
//! - [`set`]: sets with running fee and weight totals.
//! - [`closure`]: a relation and its transitive closure under node removal.
//! - [`graph`]: paired ancestor/descendant closures ([`graph::DynGraph`]),
//!   specialised to transactions as [`graph::TxGraph`].
//! - [`compare`]: multi-criteria ordering of candidate sets.
//! - [`heap`] and [`builder`]: the selection engine.
//! - [`collect`]: driving the engine across rising weight limits.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums in [`error`]; each maps to an
//!   [`error::ErrorCode`].
//! - **Logging**: `tracing` macros; nothing here prints.

pub mod builder;
pub mod closure;
pub mod collect;
pub mod compare;
pub mod error;
pub mod graph;
pub mod heap;
pub mod set;
pub mod tx;

pub use builder::{AncestorSet, AncestorSetBuilder, CONSENSUS_WEIGHT_LIMIT, MAX_CONSECUTIVE_FAILURES};
pub use collect::{BlockCollector, Dim};
pub use compare::{Candidate, ChainCompare, Criterion};
pub use error::{BuilderError, CollectError, ErrorCode, GraphError};
pub use graph::{DynGraph, TxGraph};
pub use set::SizedSet;
pub use tx::{Pool, Tx, TxRef};
