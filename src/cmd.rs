//! Command implementations for the CLI interface.
//!
//! Each subcommand loads the task export, narrows it to a project, computes
//! the S-curve and hands the series to one of the renderers.

use std::path::{Path, PathBuf};

use chrono::Local;
use clap::{Args, Subcommand};
use clap_complete::{generate, Shell};
use tracing::info;

use crate::config::Settings;
use crate::curve::{compute_s_curve_with, summarize, CurveSettings};
use crate::db::{parse_date_arg, Database};
use crate::error::{AppError, AppResult};
use crate::report::{format_summary, print_table, series_to_csv};
use crate::task::WeightedTask;
use crate::tui::app::NO_DATA_MESSAGE;
use crate::tui::run::run_chart_tui;

/// Options shared by every command that computes a curve.
#[derive(Args, Clone, Debug, Default)]
pub struct CurveArgs {
    /// Project to chart. Defaults to the configured project, else all tasks.
    #[arg(long)]
    pub project: Option<String>,
    /// Days appended after the last milestone date.
    #[arg(long)]
    pub buffer_days: Option<u32>,
    /// Decimal places kept in each percentage.
    #[arg(long)]
    pub decimals: Option<u32>,
    /// Let task start dates widen the timeline.
    #[arg(long)]
    pub include_starts: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the daily series as a table.
    Table {
        #[command(flatten)]
        curve: CurveArgs,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Export the daily series to CSV.
    Export {
        #[command(flatten)]
        curve: CurveArgs,
        /// Output file path.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show progress and schedule variance on one day.
    Summary {
        #[command(flatten)]
        curve: CurveArgs,
        /// Day to report on (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Open the interactive chart.
    Chart {
        #[command(flatten)]
        curve: CurveArgs,
    },

    /// List projects found in the export.
    Projects,

    /// Show the effective settings, optionally writing them to the settings file.
    Config {
        /// Write the current settings to the settings file.
        #[arg(long)]
        write: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Resolved paths and settings for one invocation.
pub struct Context {
    pub settings: Settings,
    pub settings_path: PathBuf,
    pub data_path: PathBuf,
}

impl Context {
    pub fn new(settings: Settings, settings_path: PathBuf, data_flag: Option<&Path>) -> Self {
        let data_path = settings.data_path(data_flag);
        Context { settings, settings_path, data_path }
    }

    fn load_db(&self) -> AppResult<Database> {
        Database::load(&self.data_path)
    }
}

/// Everything a curve command needs: the project, its tasks and the settings.
struct CurveInput {
    project: Option<String>,
    tasks: Vec<WeightedTask>,
    settings: CurveSettings,
}

fn load_curve_input(ctx: &Context, args: &CurveArgs) -> AppResult<CurveInput> {
    let settings = ctx
        .settings
        .curve_settings(args.buffer_days, args.decimals, args.include_starts)?;
    let project = ctx.settings.project(args.project.as_deref());
    let db = ctx.load_db()?;
    let tasks = db.weighted_tasks(project.as_deref())?;
    info!(
        project = project.as_deref().unwrap_or("(all)"),
        tasks = tasks.len(),
        "loaded curve input"
    );
    Ok(CurveInput { project, tasks, settings })
}

/// Print the daily series.
pub fn cmd_table(ctx: &Context, args: &CurveArgs, limit: Option<usize>) -> AppResult<()> {
    let input = load_curve_input(ctx, args)?;
    let series = compute_s_curve_with(&input.tasks, &input.settings);
    if series.is_empty() {
        println!("{NO_DATA_MESSAGE}");
        return Ok(());
    }
    print_table(&series, limit);
    Ok(())
}

/// Write the daily series to a CSV file.
pub fn cmd_export(ctx: &Context, args: &CurveArgs, output: Option<String>) -> AppResult<()> {
    let output_path = output.unwrap_or_else(|| "s_curve.csv".to_string());
    let input = load_curve_input(ctx, args)?;
    let series = compute_s_curve_with(&input.tasks, &input.settings);
    if series.is_empty() {
        println!("{NO_DATA_MESSAGE}");
        return Ok(());
    }
    std::fs::write(&output_path, series_to_csv(&series))?;
    println!("Exported {} day(s) to {}", series.len(), output_path);
    Ok(())
}

/// Print a progress summary for one day.
pub fn cmd_summary(ctx: &Context, args: &CurveArgs, as_of: Option<String>) -> AppResult<()> {
    let as_of = match as_of {
        Some(s) => parse_date_arg(&s)?,
        None => Local::now().date_naive(),
    };
    let input = load_curve_input(ctx, args)?;
    let series = compute_s_curve_with(&input.tasks, &input.settings);
    match summarize(&input.tasks, &series, as_of, &input.settings) {
        Some(summary) => print!("{}", format_summary(input.project.as_deref(), &summary)),
        None => println!("{NO_DATA_MESSAGE}"),
    }
    Ok(())
}

/// Launch the interactive chart.
pub fn cmd_chart(ctx: &Context, args: &CurveArgs) -> AppResult<()> {
    let settings = ctx
        .settings
        .curve_settings(args.buffer_days, args.decimals, args.include_starts)?;
    let project = ctx.settings.project(args.project.as_deref());
    let db = ctx.load_db()?;
    if let Some(p) = project.as_deref() {
        if db.for_project(Some(p)).is_empty() {
            return Err(AppError::ProjectNotFound { project: p.to_string() });
        }
    }
    run_chart_tui(db, project, settings).map_err(|e| AppError::Terminal(e.to_string()))
}

/// List projects with their task counts.
pub fn cmd_projects(ctx: &Context) -> AppResult<()> {
    let db = ctx.load_db()?;
    println!("{:<24} {}", "Project", "Tasks");
    for (p, c) in db.projects() {
        println!("{:<24} {}", p, c);
    }
    Ok(())
}

/// Show the effective settings; with `write`, persist them.
pub fn cmd_config(ctx: &Context, write: bool) -> AppResult<()> {
    println!("Settings file: {}", ctx.settings_path.display());
    println!("Task export:   {}", ctx.data_path.display());
    println!("{}", serde_json::to_string_pretty(&ctx.settings)?);
    if write {
        ctx.settings.save(&ctx.settings_path)?;
        println!("Saved settings to {}", ctx.settings_path.display());
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
