//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for PiiCatcher using clap.

pub mod commands;
pub mod output;

use crate::domain::OutputFormat;
use clap::{Parser, Subcommand};

/// PiiCatcher - scan databases for personally identifiable information
#[derive(Parser, Debug)]
#[command(name = "piicatcher")]
#[command(version, about, long_about = None)]
#[command(author = "Atlas Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults to ./piicatcher.toml when present)
    #[arg(short, long, env = "PIICATCHER_CONFIG", global = true)]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PIICATCHER_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Report format (tabular or json)
    #[arg(long, global = true)]
    pub output_format: Option<OutputFormat>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a SQLite database file
    Sqlite(commands::scan::SqliteArgs),

    /// Scan a PostgreSQL database
    Postgresql(commands::scan::ServerArgs),

    /// Scan a MySQL database
    Mysql(commands::scan::ServerArgs),

    /// Scan an Amazon Redshift cluster
    Redshift(commands::scan::ServerArgs),

    /// Scan a Snowflake warehouse
    Snowflake(commands::scan::SnowflakeArgs),

    /// Scan an Amazon Athena data catalog
    Athena(commands::scan::AthenaArgs),

    /// Show the current PII annotations of a catalogued source
    Report(commands::report::ReportArgs),

    /// Show the scan history of a source
    Status(commands::status::StatusArgs),

    /// List the registered detectors
    Detectors(commands::detectors::DetectorsArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Cli {
    pub fn config_path(&self) -> Option<&str> {
        self.config.as_deref()
    }
}
