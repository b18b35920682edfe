//! RankRight CLI - score documents and web pages from the command line.

use clap::Parser;
use rankright_cli::commands;
use rankright_cli::config::OutputFormat;
use rankright_cli::{Cli, CliError, Command, Config, Formatter};
use rankright_store::SqliteStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // A missing .env file is normal; the environment may already be set
    dotenvy::dotenv().ok();

    // Initialize tracing (log to stderr)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let color_enabled = !cli.no_color;

    if !cli.command.reads_config() {
        let format = cli.format.map(Into::into).unwrap_or(OutputFormat::Table);
        let formatter = Formatter::new(format, color_enabled);
        if let Err(e) = run_without_config(&cli, &formatter) {
            exit_with(&e, &formatter);
        }
        return;
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("  - Run `rankright init --force` to write a fresh configuration");
            std::process::exit(2);
        }
    };

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let formatter = Formatter::new(format, color_enabled && config.settings.color);

    if let Err(e) = run(cli, &config, &formatter).await {
        exit_with(&e, &formatter);
    }
}

fn exit_with(e: &CliError, formatter: &Formatter) -> ! {
    eprintln!("{}", formatter.error(&e.to_string()));
    for step in e.guidance() {
        eprintln!("  - {}", step);
    }
    std::process::exit(1);
}

fn load_config(cli: &Cli) -> rankright_cli::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(db) = &cli.db {
        config.database = Some(db.clone());
    }
    Ok(config)
}

fn run_without_config(cli: &Cli, formatter: &Formatter) -> rankright_cli::Result<()> {
    match cli.command {
        Command::Init { force } => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::path()?,
            };
            let config = Config {
                database: cli.db.clone(),
                ..Default::default()
            };
            commands::execute_init(&config, &path, force, formatter)
        }
        _ => {
            println!("{}", formatter.format_criteria()?);
            Ok(())
        }
    }
}

async fn run(cli: Cli, config: &Config, formatter: &Formatter) -> rankright_cli::Result<()> {
    match cli.command {
        Command::Check(args) => {
            commands::execute_check(args, formatter).await?;
        }
        Command::Analyze(args) => {
            let db_path = config.database_path()?;
            commands::execute_analyze(args, config, &db_path, formatter).await?;
        }
        cmd => {
            // Commands that only read or clear the local history
            let mut store = SqliteStore::new(config.database_path()?)?;

            match cmd {
                Command::History(args) => {
                    commands::execute_history(args, config.settings.history_limit, &store, formatter)?;
                }
                Command::Show { id } => {
                    commands::execute_show(&id, &store, formatter)?;
                }
                Command::Report(args) => {
                    commands::execute_report(args, &store, formatter)?;
                }
                Command::Stats => {
                    commands::execute_stats(&store, formatter)?;
                }
                Command::Clear { yes } => {
                    commands::execute_clear(yes, &mut store, formatter)?;
                }
                // Dispatched before the configuration is loaded
                Command::Criteria | Command::Init { .. } => {}
                Command::Check(_) | Command::Analyze(_) => {}
            }
        }
    }

    Ok(())
}
