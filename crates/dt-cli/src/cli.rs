//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Daily tracker.
///
/// Evaluates schedules, goals and streaks over a snapshot of tracked metrics
/// and their daily logs.
#[derive(Debug, Parser)]
#[command(name = "dt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List metrics due on a day.
    Due {
        /// Day to check: YYYY-MM-DD, "today", "yesterday" or "N days ago".
        #[arg(short, long)]
        date: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show goal progress for a day.
    Goals {
        /// Day to check: YYYY-MM-DD, "today", "yesterday" or "N days ago".
        #[arg(short, long)]
        date: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show current and longest streaks.
    Streaks {
        /// Reference day for current streaks (defaults to today).
        #[arg(short, long)]
        date: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Summarize every day of a month.
    Summary {
        /// Month as YYYY-MM (defaults to the current month).
        #[arg(short, long)]
        month: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Rewrite the metrics file in the current record format.
    Migrate {
        /// Report what would change without writing.
        #[arg(long)]
        dry_run: bool,
    },
}
