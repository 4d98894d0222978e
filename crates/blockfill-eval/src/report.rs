//! Comparing two comparators over many snapshots and summarising the result.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blockfill_core::ChainCompare;
use blockfill_pool::{Snapshot, content_hash};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::diff::{EvalDiff, diff};
use crate::observer::Observer;
use crate::sweep::{Sweep, blocks_for_limits};

/// Outcome for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolComparison {
    pub path: PathBuf,
    pub label: String,
    pub content_hash: String,
    pub agg_weight: u64,
    pub diff: EvalDiff,
}

/// Everything `bf compare` persists to `results.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub left: String,
    pub right: String,
    pub sweep: Sweep,
    pub pools: Vec<PoolComparison>,
}

impl ComparisonReport {
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing report")?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a report.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}

/// Comparison knobs shared by every pool.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub left: ChainCompare,
    pub right: ChainCompare,
    pub sweep: Sweep,
    /// Pools not heavier than this are skipped. Defaults to the last limit.
    pub min_size: Option<u64>,
    pub max_failures: usize,
}

/// Run both comparators over every snapshot and diff the results.
///
/// Snapshots whose aggregate weight does not exceed the minimum size are
/// skipped, since every limit would admit the whole pool for both sides.
///
/// # Errors
///
/// Fails on the first snapshot whose evaluation fails.
#[instrument(skip_all, fields(pools = snapshots.len(), left = %opts.left, right = %opts.right))]
pub fn compare_pools(
    snapshots: &[Snapshot],
    opts: &CompareOptions,
    observer: &dyn Observer,
) -> Result<ComparisonReport> {
    let limits = opts.sweep.limits();
    let min_size = opts.min_size.unwrap_or_else(|| opts.sweep.last());

    let mut pools = Vec::new();
    for (i, snap) in snapshots.iter().enumerate() {
        let name = snap.path.display().to_string();
        let agg_weight = snap.agg_weight();
        if agg_weight <= min_size {
            observer.pool_skipped(&name, agg_weight, min_size);
            continue;
        }
        observer.pool_started(&name, i, snapshots.len());

        let run = |compare: &ChainCompare| {
            blocks_for_limits(&snap.pool, compare, &limits, opts.max_failures, observer)
                .with_context(|| format!("evaluating {name} with {compare}"))
        };
        let a = run(&opts.left)?;
        let b = run(&opts.right)?;
        let d = diff(&a, &b);
        info!(pool = %name, avg_diff = d.avg_diff, differing = d.diff.len(), "pool compared");

        pools.push(PoolComparison {
            path: snap.path.clone(),
            label: snap.label(),
            content_hash: content_hash(&snap.pool),
            agg_weight,
            diff: d,
        });
    }

    Ok(ComparisonReport {
        left: opts.left.to_string(),
        right: opts.right.to_string(),
        sweep: opts.sweep,
        pools,
    })
}

/// Markdown summary with one row per compared pool.
#[must_use]
pub fn markdown_table(rows: &[PoolComparison]) -> String {
    let mut out = String::from("|name|size (Mweight)|avg diff|\n|---|---:|---:|\n");
    for row in rows {
        #[allow(clippy::cast_precision_loss)]
        let mweight = row.agg_weight as f64 / 1e6;
        let _ = writeln!(out, "|{}|{mweight:.0}|{:.2}|", row.label, row.diff.avg_diff);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, agg_weight: u64, avg_diff: f64) -> PoolComparison {
        PoolComparison {
            path: PathBuf::from(format!("{label}_0.mempool")),
            label: label.to_string(),
            content_hash: String::new(),
            agg_weight,
            diff: EvalDiff {
                avg_diff,
                ..EvalDiff::default()
            },
        }
    }

    #[test]
    fn table_rounds_sizes_and_averages() {
        let table = markdown_table(&[row("1650000000", 12_600_000, 41.256), row("x", 4_400_000, -3.0)]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "|name|size (Mweight)|avg diff|");
        assert_eq!(lines[2], "|1650000000|13|41.26|");
        assert_eq!(lines[3], "|x|4|-3.00|");
    }

    #[test]
    fn empty_table_is_just_the_header() {
        assert_eq!(markdown_table(&[]).lines().count(), 2);
    }
}
