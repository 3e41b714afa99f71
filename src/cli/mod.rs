//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Deterministic event ordering for concurrent suite runs
#[derive(Parser, Debug)]
#[command(name = "ordinal-tracker")]
#[command(version)]
#[command(about = "Run suites in parallel and report their events in a stable order")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a suite plan and print its ordered events
    Run(RunArgs),

    /// Print the ordinal that follows ORDINAL
    Advance(OrdinalArgs),

    /// Fork ORDINAL into a child branch and the parent continuation
    Fork(OrdinalArgs),

    /// Compare two ordinals
    Compare(CompareArgs),

    /// Show or create configuration
    Config(ConfigArgs),

    /// List environment variable overrides
    Env,
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Suite plan file (defaults to the built-in demo plan)
    #[arg(short, long)]
    pub plan: Option<PathBuf>,

    /// Leading ordinal component of the first run
    #[arg(short = 's', long)]
    pub run_stamp: Option<u64>,

    /// Maximum test bodies running at once
    #[arg(short = 'n', long)]
    pub concurrent: Option<usize>,

    /// Upper bound of random delay added to each test (ms)
    #[arg(short, long)]
    pub jitter_ms: Option<u64>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Number of rounds, each with its own run stamp
    #[arg(short, long, default_value = "1")]
    pub rounds: u32,

    /// Also write the ordered log to this file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Also print each event to stderr as it is reported, in arrival order
    #[arg(long)]
    pub live: bool,
}

/// A single ordinal argument
#[derive(Parser, Debug)]
pub struct OrdinalArgs {
    /// Ordinal as dotted components, e.g. 0.3.1 or [0,3,1]
    pub ordinal: String,
}

/// Arguments for compare command
#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// Left ordinal
    pub a: String,

    /// Right ordinal
    pub b: String,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show {
        /// Print as JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Write an example configuration file
    Init {
        /// Destination path
        #[arg(default_value = "./ordinal-tracker.yaml")]
        path: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
