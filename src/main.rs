// PiiCatcher - PII scanner for relational databases
// Copyright (c) 2025 Atlas Contributors
// Licensed under the MIT License

use clap::Parser;
use piicatcher::cli::{Cli, Commands};
use piicatcher::config::{load_config_or_default, PiiCatcherConfig};
use piicatcher::domain::SourceType;
use piicatcher::logging::init_logging;
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Commands report configuration errors themselves; logging only needs
    // the [application] and [logging] sections, so fall back to defaults.
    let config = load_config_or_default(cli.config_path().map(Path::new)).unwrap_or_default();
    let log_level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.application.log_level.clone());

    let guard = match init_logging(&log_level, &logging_config(&cli, &config)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "PiiCatcher starting");

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // process::exit skips destructors
    drop(guard);
    process::exit(exit_code);
}

/// File logging only applies to scans; other commands log to the console
fn logging_config(cli: &Cli, config: &PiiCatcherConfig) -> piicatcher::config::LoggingConfig {
    let mut logging = config.logging.clone();
    if matches!(
        cli.command,
        Commands::ValidateConfig(_) | Commands::Init(_) | Commands::Detectors(_)
    ) {
        logging.local_enabled = false;
    }
    logging
}

async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    let config = cli.config_path();
    let format = cli.output_format;
    match &cli.command {
        Commands::Sqlite(args) => args.execute(config, format).await,
        Commands::Postgresql(args) => args.execute(SourceType::Postgresql, config, format).await,
        Commands::Mysql(args) => args.execute(SourceType::Mysql, config, format).await,
        Commands::Redshift(args) => args.execute(SourceType::Redshift, config, format).await,
        Commands::Snowflake(args) => args.execute(config, format).await,
        Commands::Athena(args) => args.execute(config, format).await,
        Commands::Report(args) => args.execute(config, format).await,
        Commands::Status(args) => args.execute(config).await,
        Commands::Detectors(args) => args.execute(config).await,
        Commands::ValidateConfig(args) => args.execute(config).await,
        Commands::Init(args) => args.execute().await,
    }
}
