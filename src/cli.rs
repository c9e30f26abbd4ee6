use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// S-curve calculator for weighted task exports.
/// Tasks are read from ./tasks.json, the configured export, or a path passed via --data.
#[derive(Parser)]
#[command(name = "scurve", version, about = "Cumulative progress curves from task exports")]
pub struct Cli {
    /// Path to the JSON task export.
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Path to the settings file (default ~/.scurve/settings.json).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity. May be repeated.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}
