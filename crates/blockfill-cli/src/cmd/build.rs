//! `bf build`: fill one block.

use std::io::{self, Write};
use std::path::PathBuf;

use blockfill_core::{AncestorSet, AncestorSetBuilder};
use clap::Args;
use serde::Serialize;
use tracing::info;

use super::{Ctx, load_graph};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `bf build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Pool snapshot (.json, .mempool or .txt).
    pub pool: PathBuf,

    /// Block weight limit [default: from config, else 3992820].
    #[arg(long)]
    pub max_weight: Option<u64>,

    /// Consecutive misfits tolerated before stopping [default: from config, else 1000].
    #[arg(long)]
    pub max_failures: Option<usize>,

    /// Named comparator chain or comma-separated criteria.
    #[arg(long)]
    pub comparator: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SetRow {
    pub rep: String,
    pub members: Vec<String>,
    pub fee: i64,
    pub weight: u64,
    pub fee_rate: f64,
}

impl From<&AncestorSet> for SetRow {
    fn from(set: &AncestorSet) -> Self {
        Self {
            rep: set.tx.id().to_string(),
            members: set.member_ids().into_iter().map(str::to_string).collect(),
            fee: set.agg_fee(),
            weight: set.agg_weight(),
            fee_rate: set.agg_fee_rate(),
        }
    }
}

/// Report payload for `bf build`.
#[derive(Debug, Serialize)]
pub struct BuildReport {
    pub pool: PathBuf,
    pub comparator: String,
    pub max_weight: u64,
    pub sets: Vec<SetRow>,
    pub txs: usize,
    pub fee: i64,
    pub weight: u64,
    /// Sets thrown away because they did not fit.
    pub discarded: usize,
    /// Transactions still in the pool afterwards.
    pub left: usize,
}

/// Execute `bf build`.
pub fn run_build(args: &BuildArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let compare = ctx.comparator(args.comparator.as_deref())?;
    let max_weight = args.max_weight.unwrap_or(ctx.config.max_weight);
    let max_failures = args
        .max_failures
        .unwrap_or(ctx.config.max_consecutive_failures);

    let (_, graph) = load_graph(&args.pool)?;
    let mut builder = AncestorSetBuilder::new(graph, compare.clone());

    let mut sets = Vec::new();
    let mut ordering = builder.ordered_ancestor_sets(max_weight, max_failures);
    for set in &mut ordering {
        sets.push(SetRow::from(&set?));
    }
    let discarded = ordering.discarded();

    let report = BuildReport {
        pool: args.pool.clone(),
        comparator: compare.to_string(),
        max_weight,
        txs: sets.iter().map(|s| s.members.len()).sum(),
        fee: sets.iter().map(|s| s.fee).sum(),
        weight: sets.iter().map(|s| s.weight).sum(),
        sets,
        discarded,
        left: builder.len(),
    };
    info!(
        txs = report.txs,
        weight = report.weight,
        fee = report.fee,
        "block built"
    );

    render_mode(ctx.output, &report, render_text, render_pretty)
}

fn render_text(report: &BuildReport, w: &mut dyn Write) -> io::Result<()> {
    for set in &report.sets {
        writeln!(
            w,
            "{} {} {} {}",
            set.rep,
            set.fee,
            set.weight,
            set.members.join(",")
        )?;
    }
    writeln!(w, "total {} {} {}", report.fee, report.weight, report.txs)
}

fn render_pretty(report: &BuildReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Block from {}", report.pool.display()))?;
    writeln!(
        w,
        "{:<20} {:>5} {:>12} {:>9} {:>10}",
        "rep", "txs", "fee", "weight", "rate"
    )?;
    for set in &report.sets {
        writeln!(
            w,
            "{:<20} {:>5} {:>12} {:>9} {:>10.3}",
            short(&set.rep),
            set.members.len(),
            set.fee,
            set.weight,
            set.fee_rate
        )?;
    }
    writeln!(w)?;
    pretty_kv(w, "comparator", &report.comparator)?;
    pretty_kv(w, "transactions", report.txs.to_string())?;
    pretty_kv(w, "fee", report.fee.to_string())?;
    pretty_kv(
        w,
        "weight",
        format!("{} / {}", report.weight, report.max_weight),
    )?;
    pretty_kv(w, "discarded sets", report.discarded.to_string())?;
    pretty_kv(w, "left in pool", report.left.to_string())
}

/// Long txids are cut to 16 characters for the table.
fn short(id: &str) -> &str {
    id.get(..16).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ids_are_left_alone() {
        assert_eq!(short("abc"), "abc");
        assert_eq!(short(&"f".repeat(64)).len(), 16);
    }
}
