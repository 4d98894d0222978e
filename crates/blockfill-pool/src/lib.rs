#![forbid(unsafe_code)]
//! blockfill-pool library.
//!
//! Turns pool snapshots into [`blockfill_core::Pool`] maps and back, and
//! offers the diagnostics that make a rejected snapshot understandable.
//!
//! # Conventions
//!
//! - **Errors**: [`PoolError`] for anything read from disk; graph-level
//!   failures stay [`blockfill_core::GraphError`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod cycles;
pub mod error;
pub mod json;
pub mod load;
pub mod stats;
pub mod synth;
pub mod text;
pub mod verify;

pub use cycles::find_cycles;
pub use error::PoolError;
pub use json::{RecordedStats, parse_json};
pub use load::{Snapshot, SnapshotFormat, load_pool, snapshot_label};
pub use stats::{PoolStats, content_hash, weight_to_vsize};
pub use synth::{SynthParams, generate_pool};
pub use text::{parse_text, write_text};
pub use verify::{Stat, StatMismatch, verify_recorded_stats};
