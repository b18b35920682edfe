//! RankRight CLI library.
//!
//! Configuration, command execution and output formatting for the
//! `rankright` command-line front end.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod report;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
