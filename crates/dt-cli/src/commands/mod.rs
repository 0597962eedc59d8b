//! CLI subcommand implementations.

pub mod due;
pub mod goals;
pub mod migrate;
pub mod streaks;
pub mod summary;
pub mod util;
