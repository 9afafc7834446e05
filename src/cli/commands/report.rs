//! Report command implementation
//!
//! Renders the stored annotations of a catalogued source without scanning.

use super::{load_config, open_catalog, report_failure, FilterArgs};
use crate::cli::output;
use crate::core::api::render_report;
use crate::domain::{app_name, OutputFormat, PiiCatcherError};
use clap::Args;

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Catalog name of the source
    #[arg(long)]
    pub name: String,

    /// Also report columns changed since the latest recorded scan
    #[arg(long)]
    pub since_last_run: bool,

    /// Report every column, not only those with PII
    #[arg(long)]
    pub list_all: bool,

    #[command(flatten)]
    pub filters: FilterArgs,
}

impl ReportArgs {
    /// Execute the report command
    pub async fn execute(
        &self,
        config_path: Option<&str>,
        output_format: Option<OutputFormat>,
    ) -> anyhow::Result<i32> {
        tracing::info!(source = %self.name, "Rendering report");

        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => return Ok(report_failure("Failed to load configuration", &e)),
        };

        let catalog = match open_catalog(&config).await {
            Ok(catalog) => catalog,
            Err(e) => return Ok(report_failure("Failed to open catalog", &e)),
        };

        let source = match catalog.get_source(&self.name).await {
            Ok(source) => source,
            Err(e) => return Ok(report_failure("Unknown source", &e)),
        };

        let last_run = if self.since_last_run {
            match catalog.get_latest_task(&app_name(&self.name)).await {
                Ok(task) => task.map(|t| t.updated_at),
                Err(e) => return Ok(report_failure("Failed to read scan history", &e)),
            }
        } else {
            None
        };

        let format = output_format.unwrap_or(config.scan.output_format);
        let list_all = self.list_all || config.scan.list_all;
        let report = match render_report(
            catalog.as_ref(),
            &source,
            format,
            list_all,
            last_run,
            &self.filters.to_filters(),
        )
        .await
        {
            Ok(report) => report,
            Err(e) => return Ok(report_failure("Failed to render report", &e)),
        };

        println!("{}", output::render_report(&report)?);

        if report.is_empty() && !list_all {
            return Ok(super::exit_code(&PiiCatcherError::NoMatches));
        }
        Ok(0)
    }
}
