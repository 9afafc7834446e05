//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the PiiCatcher configuration file.

use crate::config::{
    load_config, redact_connection_string, CatalogBackend, PiiCatcherConfig, DEFAULT_CONFIG_FILE,
};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let config_path = config_path.unwrap_or(DEFAULT_CONFIG_FILE);
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                for line in summary(&config) {
                    println!("{line}");
                }
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }
}

fn summary(config: &PiiCatcherConfig) -> Vec<String> {
    let mut lines = vec![
        "Configuration Summary:".to_string(),
        format!("  Log Level: {}", config.application.log_level),
    ];

    match config.catalog.backend {
        CatalogBackend::Memory => lines.push("  Catalog: memory".to_string()),
        CatalogBackend::PostgreSQL => {
            lines.push("  Catalog: postgresql".to_string());
            if let Some(ref pg) = config.catalog.postgresql {
                lines.push(format!(
                    "  Catalog Connection: {}",
                    redact_connection_string(&pg.connection_string)
                ));
                lines.push(format!("  Max Connections: {}", pg.max_connections));
            }
        }
    }

    lines.push(format!("  Scan Type: {}", config.scan.scan_type));
    lines.push(format!("  Incremental: {}", config.scan.incremental));
    lines.push(format!("  Sample Size: {}", config.scan.sample_size));
    lines.push(format!(
        "  Small Table Threshold: {}",
        config.scan.small_table_threshold
    ));
    lines.push(format!("  Output Format: {}", config.scan.output_format));
    lines.push(format!(
        "  Custom Detectors: {}",
        config.detectors.custom.len()
    ));
    lines
}
