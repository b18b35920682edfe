//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// RankRight - Score documents and web pages against six quality criteria.
#[derive(Debug, Parser)]
#[command(name = "rankright")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "RANKRIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file path
    #[arg(long, global = true, env = "RANKRIGHT_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs and scores only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a document or web page
    Analyze(AnalyzeArgs),

    /// List past analyses, newest first
    History(HistoryArgs),

    /// Show one analysis with its criterion results
    Show {
        /// Analysis ID
        id: String,
    },

    /// Export a plain-text report for an analysis
    Report(ReportArgs),

    /// Show aggregate statistics
    Stats,

    /// List the evaluation criteria
    Criteria,

    /// Validate model configuration and test the connection
    Check(CheckArgs),

    /// Write a configuration file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Delete every stored analysis
    Clear {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Arguments for the analyze command.
#[derive(Debug, Args)]
#[command(group(clap::ArgGroup::new("input").required(true).args(["file", "url"])))]
pub struct AnalyzeArgs {
    /// PDF, DOCX or TXT file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Web page address
    #[arg(long)]
    pub url: Option<String>,
}

/// Arguments for the history command.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Maximum number of analyses (defaults to the configured history limit)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Number of analyses to skip
    #[arg(long, default_value = "0")]
    pub offset: usize,
}

/// Arguments for the report command.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Analysis ID
    pub id: String,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the check command.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Only validate settings, do not contact the model
    #[arg(long)]
    pub offline: bool,
}

impl Command {
    /// Whether the command needs the configuration file
    ///
    /// `criteria` is static and `init` writes the file, so neither may be
    /// blocked by a broken one.
    pub fn reads_config(&self) -> bool {
        !matches!(self, Command::Criteria | Command::Init { .. })
    }
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
