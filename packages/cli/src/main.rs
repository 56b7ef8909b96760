mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    blocks, check, init, normalize, toc, BlocksArgs, CheckArgs, InitArgs, NormalizeArgs, TocArgs,
};
use config::Config;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Coursekit CLI - lesson documents and course outlines
#[derive(Parser, Debug)]
#[command(name = "coursekit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ./coursekit.config.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new course
    Init(InitArgs),

    /// Check lesson documents against the composite shape rules
    Check(CheckArgs),

    /// List the tracked blocks of a lesson
    Blocks(BlocksArgs),

    /// Repair a lesson document and write it back out
    Normalize(NormalizeArgs),

    /// Edit the course outline
    Toc(TocArgs),
}

fn load_config(cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::load(cwd, explicit)?;
    tracing::debug!(lessons_dir = %config.lessons_dir, "Loaded config");
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let explicit = cli.config.as_deref();

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Check(args) => check(args, &cwd, &load_config(&cwd, explicit)?),
        Command::Blocks(args) => blocks(args, &cwd, &load_config(&cwd, explicit)?),
        Command::Normalize(args) => normalize(args, &cwd, &load_config(&cwd, explicit)?),
        Command::Toc(args) => toc(args, &cwd, &load_config(&cwd, explicit)?),
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
