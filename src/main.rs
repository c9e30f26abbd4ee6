//! # scurve - Progress Curve CLI
//!
//! Computes project S-curves from a task export: the cumulative share of task
//! weight (points) that the baseline schedule, the current plan and actual
//! completion have reached on each day of the project.
//!
//! ## Key Features
//!
//! - **Three curves**: baseline plan, expected plan and actual progress on a shared daily axis
//! - **Weighted or counted**: task points drive the curve; without points every task counts once
//! - **Lenient input**: blank or malformed dates are treated as missing, never as errors
//! - **Several outputs**: terminal table, CSV export, day summary with schedule variance, and
//!   an interactive chart
//!
//! ## Quick Start
//!
//! ```bash
//! # Daily table for one project
//! scurve --data tasks.json table --project PROJ-0001
//!
//! # Where does the project stand today?
//! scurve summary --project PROJ-0001
//!
//! # CSV for a spreadsheet
//! scurve export --project PROJ-0001 --output s_curve.csv
//!
//! # Interactive chart
//! scurve chart
//! ```
//!
//! ## Input
//!
//! The export is the platform's task list as JSON, either a bare array or wrapped
//! in `{"data": [...]}`. The fields read are `exp_end_date` (planned),
//! `custom_baseline_end_date` (baseline), `completed_on` / `custom_actual_end_date`
//! (actual, counted only for `Completed` tasks), `custom_points` (weight) and
//! `project`.
//!
//! Settings are stored in `~/.scurve/settings.json`; see `scurve config`.

use std::path::Path;

use clap::Parser;
use tracing::{error, info};

pub mod cli;
pub mod cmd;
pub mod config;
pub mod curve;
pub mod db;
pub mod error;
pub mod fields;
pub mod logging;
pub mod memo;
pub mod report;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::{default_settings_path, Settings};
use error::AppResult;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose) {
        eprintln!("Failed to initialise logging: {e}");
    }

    if let Err(e) = run(cli) {
        error!(error = %e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> AppResult<()> {
    let Cli { data, config, command, .. } = cli;
    // Completions need neither settings nor data, so the context is built lazily.
    let load = || load_context(config.as_deref(), data.as_deref());

    match command {
        Commands::Table { curve, limit } => cmd_table(&load()?, &curve, limit),
        Commands::Export { curve, output } => cmd_export(&load()?, &curve, output),
        Commands::Summary { curve, as_of } => cmd_summary(&load()?, &curve, as_of),
        Commands::Chart { curve } => cmd_chart(&load()?, &curve),
        Commands::Projects => cmd_projects(&load()?),
        Commands::Config { write } => cmd_config(&load()?, write),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

fn load_context(config: Option<&Path>, data: Option<&Path>) -> AppResult<Context> {
    let settings_path = config.map(Path::to_path_buf).unwrap_or_else(default_settings_path);
    let settings = Settings::load(&settings_path)?;
    let ctx = Context::new(settings, settings_path, data);
    info!(data = %ctx.data_path.display(), "using task export");
    Ok(ctx)
}
