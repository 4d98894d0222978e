//! `bf topo`: dependency-respecting order of the whole pool.

use std::path::PathBuf;

use blockfill_core::TxRef;
use clap::Args;
use serde::Serialize;

use super::{Ctx, load_graph};
use crate::output::render;

/// Arguments for `bf topo`.
#[derive(Args, Debug)]
pub struct TopoArgs {
    /// Pool snapshot (.json, .mempool or .txt).
    pub pool: PathBuf,
}

#[derive(Debug, Serialize)]
struct TopoReport {
    order: Vec<String>,
}

/// Execute `bf topo`. Transactions in the same layer are ordered by id.
pub fn run_topo(args: &TopoArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let (_, graph) = load_graph(&args.pool)?;
    let by_id = |a: &TxRef, b: &TxRef| a.id().cmp(b.id());
    let order = graph.topological_order(Some(&by_id))?;

    let report = TopoReport {
        order: order.iter().map(|tx| tx.id().to_string()).collect(),
    };
    render(ctx.output, &report, |report, w| {
        for id in &report.order {
            writeln!(w, "{id}")?;
        }
        Ok(())
    })
}
