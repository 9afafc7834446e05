//! Status command implementation
//!
//! This module implements the `status` command for displaying the scan
//! history recorded in the catalog.

use super::{load_config, open_catalog, report_failure};
use crate::adapters::catalog::Catalog;
use crate::cli::output;
use crate::domain::Result;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show the task history of this source only
    #[arg(long)]
    pub name: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        tracing::info!("Checking scan status");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => return Ok(report_failure("Failed to load configuration", &e)),
        };

        let catalog = match open_catalog(&config).await {
            Ok(c) => c,
            Err(e) => return Ok(report_failure("Failed to open catalog", &e)),
        };

        let names = match self.source_names(catalog.as_ref()).await {
            Ok(names) => names,
            Err(e) => return Ok(report_failure("Failed to read sources", &e)),
        };

        if names.is_empty() {
            println!("No sources found.");
            println!("Run 'piicatcher sqlite --name <NAME> --path <FILE>' to start scanning.");
            return Ok(0);
        }

        for name in names {
            let source = match catalog.get_source(&name).await {
                Ok(source) => source,
                Err(e) => return Ok(report_failure("Unknown source", &e)),
            };
            let tasks = match catalog.get_tasks(&source.app_name()).await {
                Ok(tasks) => tasks,
                Err(e) => return Ok(report_failure("Failed to read scan history", &e)),
            };

            println!("📊 {} ({})", source.name, source.source_type);
            if tasks.is_empty() {
                println!("   No scans recorded.");
            } else {
                println!("{}", output::tasks_table(&tasks));
            }
            println!();
        }
        Ok(0)
    }

    async fn source_names(&self, catalog: &dyn Catalog) -> Result<Vec<String>> {
        match self.name {
            Some(ref name) => Ok(vec![name.clone()]),
            None => Ok(catalog
                .list_sources()
                .await?
                .into_iter()
                .map(|s| s.name)
                .collect()),
        }
    }
}
