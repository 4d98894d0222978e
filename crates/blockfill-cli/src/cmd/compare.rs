//! `bf compare`: sweep two comparators over snapshots.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use blockfill_eval::{CompareOptions, Observer, compare_pools};
use blockfill_pool::{SnapshotFormat, load_pool};
use clap::Args;
use tracing::info;

use super::{Ctx, parse_comparator};
use crate::output::render;

/// Arguments for `bf compare`.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Snapshot files, or directories whose snapshots are all used.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Baseline comparator.
    #[arg(long, default_value = "fee-rate")]
    pub left: String,

    /// Comparator measured against the baseline [default: from config].
    #[arg(long)]
    pub right: Option<String>,

    /// Skip pools not heavier than this [default: the last sweep limit].
    #[arg(long)]
    pub min_size: Option<u64>,

    /// Where to write the results.
    #[arg(long, default_value = "results.json")]
    pub out: PathBuf,
}

/// Forwards harness progress to the log.
struct LogObserver;

impl Observer for LogObserver {
    fn pool_started(&self, name: &str, index: usize, total: usize) {
        info!(pool = name, "evaluating pool {}/{total}", index + 1);
    }

    fn pool_skipped(&self, name: &str, agg_weight: u64, min_size: u64) {
        info!(pool = name, agg_weight, min_size, "skipping light pool");
    }

    fn exhausted(&self, at_limit: u64) {
        info!(at_limit, "pool used up before the last limit");
    }
}

/// Snapshot files named by `inputs`, directories expanded and sorted.
fn collect_inputs(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = snapshots_in(input)?;
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn snapshots_in(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && SnapshotFormat::from_path(&path).is_some() {
            found.push(path);
        }
    }
    Ok(found)
}

/// Execute `bf compare`.
pub fn run_compare(args: &CompareArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let opts = CompareOptions {
        left: parse_comparator(&args.left)?,
        right: ctx.comparator(args.right.as_deref())?,
        sweep: ctx.config.sweep,
        min_size: args.min_size,
        max_failures: ctx.config.max_consecutive_failures,
    };

    let files = collect_inputs(&args.inputs)?;
    anyhow::ensure!(!files.is_empty(), "no snapshots found");
    let snapshots = files
        .iter()
        .map(|path| load_pool(path))
        .collect::<Result<Vec<_>, _>>()?;

    let report = compare_pools(&snapshots, &opts, &LogObserver)?;
    report.save(&args.out)?;
    info!(out = %args.out.display(), pools = report.pools.len(), "results written");

    render(ctx.output, &report, |report, w| {
        for pool in &report.pools {
            writeln!(
                w,
                "{} {:.2} {}",
                pool.label,
                pool.diff.avg_diff,
                pool.diff.diff.len()
            )?;
        }
        Ok(())
    })
}
