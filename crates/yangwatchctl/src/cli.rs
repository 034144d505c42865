//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use clap::builder::RangedU64ValueParser;
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;
use yangwatch_shared::inventory::DEFAULT_INVENTORY;

/// yangwatch CLI
#[derive(Parser, Debug)]
#[command(name = "yangwatchctl")]
#[command(about = "OpenConfig health checks over RESTCONF", long_about = None)]
#[command(version = crate::VERSION)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// More log output (-v debug, -vv trace); overrides $YANGWATCH_LOG
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch state from every inventory device and run the checks
    Run(RunArgs),

    /// Run the checks against documents already on disk
    Evaluate(EvaluateArgs),

    /// List the available checks
    Checks {
        /// Output JSON only
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Inventory file
    #[arg(short, long, default_value = DEFAULT_INVENTORY)]
    pub inventory: PathBuf,

    /// Where fetched documents are written (overrides the inventory)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Devices processed at once (overrides the inventory)
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub workers: Option<usize>,

    /// Run only this check; repeat for several (overrides the inventory)
    #[arg(long = "check", value_name = "ID")]
    pub checks: Vec<String>,

    /// Reproduce the historical zero-counter and domain-name behaviour
    #[arg(long)]
    pub legacy: bool,

    /// Output JSON only
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("documents")
        .args(["interfaces", "system"])
        .required(true)
        .multiple(true)
))]
pub struct EvaluateArgs {
    /// Persisted interfaces document
    #[arg(long, value_name = "FILE")]
    pub interfaces: Option<PathBuf>,

    /// Persisted system document
    #[arg(long, value_name = "FILE")]
    pub system: Option<PathBuf>,

    /// Device name used in the result tables
    #[arg(long, default_value = "local")]
    pub device: String,

    /// Run only this check; repeat for several
    #[arg(long = "check", value_name = "ID")]
    pub checks: Vec<String>,

    /// Reproduce the historical zero-counter and domain-name behaviour
    #[arg(long)]
    pub legacy: bool,

    /// Output JSON only
    #[arg(long)]
    pub json: bool,
}
