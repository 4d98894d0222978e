//! `bf stats`: pool summary.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use blockfill_core::TxGraph;
use blockfill_pool::{PoolStats, content_hash, find_cycles, load_pool};
use clap::Args;
use serde::Serialize;
use tracing::warn;

use super::Ctx;
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `bf stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Pool snapshot (.json, .mempool or .txt).
    pub pool: PathBuf,
}

/// Report payload for `bf stats`.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub pool: PathBuf,
    pub content_hash: String,
    /// Absent when the pool has cycles and no graph could be built.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PoolStats>,
    pub cycles: Vec<Vec<String>>,
}

/// Execute `bf stats`.
///
/// A cyclic pool is still summarised: the cycles are listed and the graph
/// statistics are left out.
pub fn run_stats(args: &StatsArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let snapshot = load_pool(&args.pool)?;
    let cycles = find_cycles(&snapshot.pool);
    let stats = if cycles.is_empty() {
        let graph = TxGraph::from_pool(&snapshot.pool)
            .with_context(|| format!("building transaction graph for {}", args.pool.display()))?;
        Some(PoolStats::compute(&graph))
    } else {
        warn!(cycles = cycles.len(), "pool has dependency cycles");
        None
    };

    let report = StatsReport {
        pool: args.pool.clone(),
        content_hash: content_hash(&snapshot.pool),
        stats,
        cycles,
    };
    render_mode(ctx.output, &report, render_text, render_pretty)
}

fn render_text(report: &StatsReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "hash {}", report.content_hash)?;
    if let Some(s) = &report.stats {
        writeln!(w, "txs {}", s.txs)?;
        writeln!(w, "weight {}", s.agg_weight)?;
        writeln!(w, "vsize {}", s.agg_vsize)?;
        writeln!(w, "fee {}", s.agg_fee)?;
        writeln!(w, "roots {}", s.roots)?;
        writeln!(w, "max_ancestors {}", s.max_ancestors)?;
        writeln!(w, "max_descendants {}", s.max_descendants)?;
    }
    for cycle in &report.cycles {
        writeln!(w, "cycle {}", cycle.join(","))?;
    }
    Ok(())
}

fn render_pretty(report: &StatsReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Pool {}", report.pool.display()))?;
    pretty_kv(w, "hash", &report.content_hash)?;
    if let Some(s) = &report.stats {
        pretty_kv(w, "transactions", s.txs.to_string())?;
        pretty_kv(w, "weight", s.agg_weight.to_string())?;
        pretty_kv(w, "vsize", s.agg_vsize.to_string())?;
        pretty_kv(w, "fee", s.agg_fee.to_string())?;
        pretty_kv(w, "roots", s.roots.to_string())?;
        pretty_kv(w, "max ancestors", s.max_ancestors.to_string())?;
        pretty_kv(w, "max descendants", s.max_descendants.to_string())?;
    }
    if !report.cycles.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Dependency cycles")?;
        for cycle in &report.cycles {
            writeln!(w, "  {}", cycle.join(" -> "))?;
        }
    }
    Ok(())
}
