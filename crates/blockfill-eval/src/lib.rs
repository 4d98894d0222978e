#![forbid(unsafe_code)]
//! blockfill-eval library.
//!
//! Runs two comparators over the same snapshots across a sweep of weight
//! limits and reports where the collected fees differ.
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` with context naming the pool and limit.
//! - **Logging**: Use `tracing` macros. Nothing here prints; progress goes
//!   through an [`Observer`].

pub mod diff;
pub mod observer;
pub mod report;
pub mod sweep;

pub use diff::{EvalDiff, LimitDiff, diff};
pub use observer::{NoopObserver, Observer};
pub use report::{CompareOptions, ComparisonReport, PoolComparison, compare_pools, markdown_table};
pub use sweep::{EvalResult, Sweep, blocks_for_limits, evaluate};
