//! `bf verify`: recorded package statistics against computed closures.

use std::path::PathBuf;

use blockfill_pool::{SnapshotFormat, StatMismatch, verify_recorded_stats};
use clap::Args;
use serde::Serialize;

use super::{Ctx, load_graph};
use crate::output::render;

/// Arguments for `bf verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// JSON mempool dump with ancestor/descendant statistics.
    pub pool: PathBuf,
}

#[derive(Debug, Serialize)]
struct VerifyReport {
    pool: PathBuf,
    checked: usize,
    mismatches: Vec<StatMismatch>,
}

/// Execute `bf verify`. Any mismatch makes the command fail.
pub fn run_verify(args: &VerifyArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let (snapshot, graph) = load_graph(&args.pool)?;
    anyhow::ensure!(
        snapshot.format == SnapshotFormat::Json,
        "{} carries no recorded statistics; verify needs a JSON dump",
        args.pool.display()
    );

    let report = VerifyReport {
        pool: args.pool.clone(),
        checked: snapshot.recorded.len(),
        mismatches: verify_recorded_stats(&snapshot.recorded, &graph)?,
    };
    render(ctx.output, &report, |report, w| {
        for m in &report.mismatches {
            writeln!(
                w,
                "{} {}: recorded {}, computed {}",
                m.tx, m.stat, m.recorded, m.computed
            )?;
        }
        if report.mismatches.is_empty() {
            writeln!(w, "ok: {} transactions verified", report.checked)?;
        }
        Ok(())
    })?;

    anyhow::ensure!(
        report.mismatches.is_empty(),
        "{} recorded statistics disagree with the graph",
        report.mismatches.len()
    );
    Ok(())
}
