//! Tessera CLI: incremental atomic CSS builds from the command line.
//!
//! Provides `tessera build` to extract style usage and write the resulting
//! CSS, and `tessera deps` to list the files a watcher should track.

#![warn(missing_docs)]

mod build;
mod deps;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

/// Tessera, incremental atomic CSS.
#[derive(Parser, Debug)]
#[command(name = "tessera", version, about = "Tessera atomic CSS builder")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `tessera.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory to run in instead of the current one.
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract style usage and write the generated CSS.
    Build(BuildArgs),
    /// Print every file and directory a watcher should track.
    Deps,
}

/// Arguments for the `tessera build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// CSS file to rewrite in place. Prints to stdout when omitted.
    #[arg(short, long)]
    pub outfile: Option<PathBuf>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<PathBuf>,
    /// Working directory.
    pub cwd: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.quiet, cli.verbose);

    let cwd = match cli.cwd {
        Some(cwd) => cwd,
        None => match std::env::current_dir() {
            Ok(cwd) => cwd,
            Err(e) => {
                eprintln!("error: cannot read current directory: {e}");
                process::exit(1);
            }
        },
    };
    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
        cwd,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global).await,
        Command::Deps => deps::run(&global).await,
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
