#![forbid(unsafe_code)]

mod cmd;
mod config;
mod output;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "bf: ancestor-set block building over transaction pools",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Read settings from this file instead of ./blockfill.toml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Build",
        about = "Fill one block from a pool snapshot",
        long_about = "Admit ancestor sets in priority order until the weight limit is reached.",
        after_help = "EXAMPLES:\n    # Build with the configured defaults\n    bf build mempool.json\n\n    # Smaller block, strict fitting, pure fee rate\n    bf build pool.mempool --max-weight 400000 --max-failures 0 --comparator fee-rate"
    )]
    Build(cmd::build::BuildArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "Print a topological order of the pool",
        after_help = "EXAMPLES:\n    bf topo pool.mempool"
    )]
    Topo(cmd::topo::TopoArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "Summarise a pool snapshot",
        long_about = "Print counts, aggregates, the content hash and any dependency cycles.",
        after_help = "EXAMPLES:\n    bf stats mempool.json --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Inspect",
        about = "Check recorded package statistics",
        long_about = "Compare ancestor/descendant counts and fees recorded in a JSON dump with the computed closures. Exits non-zero on any mismatch.",
        after_help = "EXAMPLES:\n    bf verify mempool.json"
    )]
    Verify(cmd::verify::VerifyArgs),

    #[command(
        next_help_heading = "Evaluate",
        about = "Compare two comparators over many snapshots",
        after_help = "EXAMPLES:\n    # Every snapshot in a directory\n    bf compare snapshots/ --out results.json\n\n    # Explicit pair of comparators\n    bf compare a.json b.json --left fee-rate --right fee-rate-and-weight"
    )]
    Compare(cmd::compare::CompareArgs),

    #[command(
        next_help_heading = "Evaluate",
        about = "Render a results file as a markdown table",
        after_help = "EXAMPLES:\n    bf table results.json"
    )]
    Table(cmd::table::TableArgs),

    #[command(
        next_help_heading = "Evaluate",
        about = "Write a synthetic pool snapshot",
        after_help = "EXAMPLES:\n    bf gen --seed 7 --count 5000 --out synthetic_7.mempool"
    )]
    Gen(cmd::generate::GenArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("BLOCKFILL_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "blockfill=debug,info"
        } else {
            "blockfill=info,warn"
        })
    });

    let format = env::var("BLOCKFILL_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn context(cli: &Cli) -> anyhow::Result<cmd::Ctx> {
    let cwd = env::current_dir()?;
    let config = config::load_config(cli.config.as_deref(), &cwd)?;
    let output = resolve_output_mode(cli.json, config.output);
    debug!(?output, ?config, "configuration resolved");
    Ok(cmd::Ctx { output, config })
}

fn dispatch(command: Commands, ctx: &cmd::Ctx) -> anyhow::Result<()> {
    match command {
        Commands::Build(args) => cmd::build::run_build(&args, ctx),
        Commands::Topo(args) => cmd::topo::run_topo(&args, ctx),
        Commands::Stats(args) => cmd::stats::run_stats(&args, ctx),
        Commands::Verify(args) => cmd::verify::run_verify(&args, ctx),
        Commands::Compare(args) => cmd::compare::run_compare(&args, ctx),
        Commands::Table(args) => cmd::table::run_table(&args, ctx),
        Commands::Gen(args) => cmd::generate::run_gen(&args, ctx),
    }
}

fn fail(output: OutputMode, err: &anyhow::Error) -> ExitCode {
    if render_error(output, &CliError::from(err)).is_err() {
        eprintln!("error: {err:#}");
    }
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = match context(&cli) {
        Ok(ctx) => ctx,
        // Config could not be read, so only the flag decides the format.
        Err(err) => return fail(resolve_output_mode(cli.json, None), &err),
    };
    match dispatch(cli.command, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(ctx.output, &err),
    }
}
