//! `bf table`: markdown summary of a results file.

use std::path::PathBuf;

use blockfill_eval::{ComparisonReport, markdown_table};
use clap::Args;

use super::Ctx;
use crate::output::render;

/// Arguments for `bf table`.
#[derive(Args, Debug)]
pub struct TableArgs {
    /// Results file written by `bf compare`.
    pub results: PathBuf,
}

/// Execute `bf table`. JSON mode emits the loaded report unchanged.
pub fn run_table(args: &TableArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let report = ComparisonReport::load(&args.results)?;
    render(ctx.output, &report, |report, w| {
        writeln!(w, "{} vs {}\n", report.left, report.right)?;
        write!(w, "{}", markdown_table(&report.pools))
    })
}
