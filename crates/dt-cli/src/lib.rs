//! Daily tracker CLI library.
//!
//! This crate provides the CLI interface over the `dt-core` evaluators.

mod cli;
pub mod commands;
mod config;
pub mod snapshot;

pub use cli::{Cli, Commands};
pub use config::{Config, DEFAULT_EXACT_TOLERANCE};
pub use snapshot::Snapshot;
