//! `bf gen`: synthetic snapshot.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use blockfill_pool::{SynthParams, content_hash, generate_pool, write_text};
use clap::Args;
use serde::Serialize;

use super::Ctx;
use crate::output::render;

/// Arguments for `bf gen`.
#[derive(Args, Debug)]
pub struct GenArgs {
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Number of transactions.
    #[arg(long, default_value_t = 1_000)]
    pub count: usize,

    /// Most parents a transaction may have.
    #[arg(long, default_value_t = 2)]
    pub max_parents: usize,

    /// Output file; written in the text format.
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Debug, Serialize)]
struct GenReport {
    out: PathBuf,
    txs: usize,
    content_hash: String,
}

/// Execute `bf gen`.
pub fn run_gen(args: &GenArgs, ctx: &Ctx) -> anyhow::Result<()> {
    let params = SynthParams {
        seed: args.seed,
        count: args.count,
        max_parents: args.max_parents,
        ..SynthParams::default()
    };
    let pool = generate_pool(&params);

    let file = File::create(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    let mut out = BufWriter::new(file);
    write_text(&pool, &mut out)
        .and_then(|()| out.flush())
        .with_context(|| format!("writing {}", args.out.display()))?;

    let report = GenReport {
        out: args.out.clone(),
        txs: pool.len(),
        content_hash: content_hash(&pool),
    };
    render(ctx.output, &report, |report, w| {
        writeln!(
            w,
            "wrote {} transactions to {} ({})",
            report.txs,
            report.out.display(),
            report.content_hash
        )
    })
}
