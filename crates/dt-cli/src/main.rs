use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use dt_core::GoalConfig;
use tracing_subscriber::EnvFilter;

use dt_cli::commands::util::{parse_day, parse_month};
use dt_cli::commands::{due, goals, migrate, streaks, summary};
use dt_cli::{Cli, Commands, Config, Snapshot};

/// Load config and the metrics/logs snapshot it points at.
fn open_snapshot(config_path: Option<&Path>) -> Result<(Snapshot, GoalConfig)> {
    let config = load_config(config_path)?;
    let goal_config = config
        .goal_config()
        .context("invalid exact_tolerance in configuration")?;
    let snapshot = Snapshot::load(&config)?;
    Ok((snapshot, goal_config))
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn resolve_day(arg: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    arg.map_or(Ok(today), |s| parse_day(s, today))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let today = Local::now().date_naive();

    match &cli.command {
        Some(Commands::Due { date, json }) => {
            let day = resolve_day(date.as_deref(), today)?;
            let (snapshot, _goal_config) = open_snapshot(cli.config.as_deref())?;
            due::run(&snapshot, day, *json)?;
        }
        Some(Commands::Goals { date, json }) => {
            let day = resolve_day(date.as_deref(), today)?;
            let (snapshot, goal_config) = open_snapshot(cli.config.as_deref())?;
            goals::run(&snapshot, day, &goal_config, *json)?;
        }
        Some(Commands::Streaks { date, json }) => {
            let as_of = resolve_day(date.as_deref(), today)?;
            let (snapshot, goal_config) = open_snapshot(cli.config.as_deref())?;
            streaks::run(&snapshot, as_of, &goal_config, *json)?;
        }
        Some(Commands::Summary { month, json }) => {
            let month = match month {
                Some(s) => parse_month(s)?,
                None => (today.year(), today.month()),
            };
            let (snapshot, goal_config) = open_snapshot(cli.config.as_deref())?;
            summary::run(&snapshot, month, &goal_config, *json)?;
        }
        Some(Commands::Migrate { dry_run }) => {
            let config = load_config(cli.config.as_deref())?;
            migrate::run(&mut std::io::stdout(), &config, *dry_run)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
