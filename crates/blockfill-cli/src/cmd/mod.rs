pub mod build;
pub mod compare;
pub mod generate;
pub mod stats;
pub mod table;
pub mod topo;
pub mod verify;

use std::path::Path;

use anyhow::{Context, Result};
use blockfill_core::{ChainCompare, TxGraph};
use blockfill_pool::{Snapshot, load_pool};

use crate::config::Config;
use crate::output::OutputMode;

/// What every command handler gets besides its own arguments.
#[derive(Debug)]
pub struct Ctx {
    pub output: OutputMode,
    pub config: Config,
}

impl Ctx {
    /// The comparator named on the command line, or the configured one.
    pub fn comparator(&self, flag: Option<&str>) -> Result<ChainCompare> {
        parse_comparator(flag.unwrap_or(&self.config.comparator))
    }
}

pub fn parse_comparator(name: &str) -> Result<ChainCompare> {
    name.parse::<ChainCompare>().with_context(|| {
        format!("comparator '{name}' (try fee-rate, fee-rate-and-fee or fee-rate-and-weight)")
    })
}

/// Load a snapshot and build its graph.
pub fn load_graph(path: &Path) -> Result<(Snapshot, TxGraph)> {
    let snapshot = load_pool(path)?;
    let graph = TxGraph::from_pool(&snapshot.pool)
        .with_context(|| format!("building transaction graph for {}", path.display()))?;
    Ok((snapshot, graph))
}
