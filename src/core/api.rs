//! Scan orchestration
//!
//! [`scan_database`] runs one complete scan of a source:
//!
//! 1. sync the catalog from the live database
//! 2. read the incremental watermark from the latest task
//! 3. run the metadata or data scan with the selected detectors
//! 4. render the full annotation state as a report
//! 5. record exactly one task, whatever the outcome

use crate::adapters::catalog::Catalog;
use crate::adapters::source::SourceConnector;
use crate::config::ScanConfig;
use crate::core::dbinfo::get_dbinfo;
use crate::core::detectors::DetectorRegistry;
use crate::core::generators::{column_generator, data_generator, Sampling, ScanFilters};
use crate::core::output::{output_dict, output_tabular, ReportRow, SourceReport};
use crate::core::scanner::{data_scan, metadata_scan};
use crate::domain::{PiiCatcherError, Result, Schema, Source, Task};
use crate::{log_error_with_context, log_scan_start};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use tracing::Instrument;
use uuid::Uuid;

pub use crate::domain::{OutputFormat, ScanType};

/// Parameters of one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub scan_type: ScanType,
    /// Only rescan columns changed since the latest task
    pub incremental: bool,
    /// Report every column, not only those with PII
    pub list_all: bool,
    pub output_format: OutputFormat,
    pub filters: ScanFilters,
    pub sampling: Sampling,
    /// Detector names to run; empty runs every registered detector
    pub detectors: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

impl ScanOptions {
    /// Options seeded from the `[scan]` configuration section
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            scan_type: config.scan_type,
            incremental: config.incremental,
            list_all: config.list_all,
            output_format: config.output_format,
            filters: ScanFilters::default(),
            sampling: Sampling {
                sample_size: config.sample_size,
                small_table_threshold: config.small_table_threshold,
            },
            detectors: Vec::new(),
        }
    }

    /// JSON parameter summary stored as the task message
    fn summary(&self, scan_id: Uuid) -> serde_json::Value {
        json!({
            "scan_id": scan_id.to_string(),
            "scan_type": self.scan_type.as_str(),
            "incremental": self.incremental,
            "list_all": self.list_all,
            "output_format": self.output_format.as_str(),
            "include_schema": self.filters.include_schema,
            "exclude_schema": self.filters.exclude_schema,
            "include_table": self.filters.include_table,
            "exclude_table": self.filters.exclude_table,
            "sample_size": self.sampling.sample_size,
            "detectors": self.detectors,
        })
    }
}

/// Rendered scan result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanReport {
    Tabular(Vec<ReportRow>),
    Dict(SourceReport),
}

impl ScanReport {
    /// Whether the report holds no column at all
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Tabular(rows) => rows.is_empty(),
            Self::Dict(report) => report.schemata.is_empty(),
        }
    }
}

/// Render the current annotation state of `source`
pub async fn render_report(
    catalog: &dyn Catalog,
    source: &Source,
    output_format: OutputFormat,
    list_all: bool,
    last_run: Option<DateTime<Utc>>,
    filters: &ScanFilters,
) -> Result<ScanReport> {
    Ok(match output_format {
        OutputFormat::Tabular => {
            ScanReport::Tabular(output_tabular(catalog, source, list_all, last_run, filters).await?)
        }
        OutputFormat::Json => {
            ScanReport::Dict(output_dict(catalog, source, list_all, last_run, filters).await?)
        }
    })
}

/// Refresh the catalog's view of `source` from the live database
///
/// Returns the number of columns seen.
pub async fn sync_source(
    catalog: &dyn Catalog,
    connector: &dyn SourceConnector,
    source: &Source,
) -> Result<usize> {
    let tables = {
        let mut conn = connector.connect().await?;
        conn.introspect().await?
    };

    let mut schemata: HashMap<String, Schema> = HashMap::new();
    let mut columns = 0;
    for metadata in &tables {
        let schema = match schemata.get(&metadata.schema) {
            Some(schema) => schema.clone(),
            None => {
                let schema = catalog.add_schema(source, &metadata.schema).await?;
                schemata.insert(metadata.schema.clone(), schema.clone());
                schema
            }
        };

        let table = catalog.add_table(&schema, &metadata.table).await?;
        for column in &metadata.columns {
            catalog
                .add_column(&table, &column.name, &column.data_type, column.sort_order)
                .await?;
            columns += 1;
        }
    }

    tracing::info!(
        source = %source.name,
        schemata = schemata.len(),
        tables = tables.len(),
        columns,
        "Catalog synced"
    );
    Ok(columns)
}

/// Scan `source` and return the report of its full annotation state
///
/// One task is recorded under `piicatcher.<source>` on every path: status 0
/// on success, 1 on failure with the error message added to the parameter
/// summary. A failure is returned unchanged after the task is written.
pub async fn scan_database(
    catalog: &dyn Catalog,
    connector: &dyn SourceConnector,
    registry: &DetectorRegistry,
    source: &Source,
    options: &ScanOptions,
) -> Result<ScanReport> {
    let scan_id = Uuid::new_v4();
    let span = tracing::info_span!("scan", %scan_id, source = %source.name);

    async move {
        log_scan_start!(source.name, options.scan_type);

        let result = run_scan(catalog, connector, registry, source, options).await;
        let error = result.as_ref().err();
        if let Some(err) = error {
            log_error_with_context!(err, "Scan failed");
        }

        let recorded = record_task(catalog, source, options, scan_id, error).await;
        match (result, recorded) {
            (Ok(report), Ok(task)) => {
                tracing::info!(task_id = task.id, "Scan recorded");
                Ok(report)
            }
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(_)) => Err(err),
            (Err(err), Err(task_err)) => {
                log_error_with_context!(task_err, "Failed to record scan task");
                Err(err)
            }
        }
    }
    .instrument(span)
    .await
}

async fn run_scan(
    catalog: &dyn Catalog,
    connector: &dyn SourceConnector,
    registry: &DetectorRegistry,
    source: &Source,
    options: &ScanOptions,
) -> Result<ScanReport> {
    let selected;
    let registry = if options.detectors.is_empty() {
        registry
    } else {
        selected = registry.select(&options.detectors)?;
        &selected
    };
    ensure_detectors_for(registry, options.scan_type)?;

    sync_source(catalog, connector, source).await?;

    let last_run = if options.incremental {
        catalog
            .get_latest_task(&source.app_name())
            .await?
            .map(|task| task.updated_at)
    } else {
        None
    };
    tracing::debug!(?last_run, "Incremental watermark");

    let filters = &options.filters;
    match options.scan_type {
        ScanType::Metadata => {
            metadata_scan(
                catalog,
                &registry.metadata_detectors(),
                column_generator(catalog, source, filters, last_run).await?,
                column_generator(catalog, source, filters, last_run).await?,
            )
            .await?;
        }
        ScanType::Data => {
            let dbinfo = get_dbinfo(source)?;
            let dbinfo = &*dbinfo;
            let sampling = options.sampling;
            data_scan(
                catalog,
                &registry.datum_detectors(),
                data_generator(catalog, connector, dbinfo, source, filters, last_run, sampling)
                    .await?,
                data_generator(catalog, connector, dbinfo, source, filters, last_run, sampling)
                    .await?,
            )
            .await?;
        }
    }

    render_report(
        catalog,
        source,
        options.output_format,
        options.list_all,
        None,
        filters,
    )
    .await
}

/// Record a failed scan attempt that never reached [`scan_database`]
///
/// Used when the source cannot be scanned at all, e.g. for a dialect
/// without a driver.
pub async fn record_failed_scan(
    catalog: &dyn Catalog,
    source: &Source,
    options: &ScanOptions,
    err: &PiiCatcherError,
) -> Result<Task> {
    record_task(catalog, source, options, Uuid::new_v4(), Some(err)).await
}

async fn record_task(
    catalog: &dyn Catalog,
    source: &Source,
    options: &ScanOptions,
    scan_id: Uuid,
    error: Option<&PiiCatcherError>,
) -> Result<Task> {
    let mut message = options.summary(scan_id);
    let status = match error {
        None => 0,
        Some(err) => {
            message["error"] = json!(err.to_string());
            1
        }
    };
    catalog
        .add_task(&source.app_name(), status, &message.to_string())
        .await
}

// A scan without a detector of the matching kind would mark every column
// as scanned with no PII.
fn ensure_detectors_for(registry: &DetectorRegistry, scan_type: ScanType) -> Result<()> {
    let available = match scan_type {
        ScanType::Metadata => registry.metadata_detectors().len(),
        ScanType::Data => registry.datum_detectors().len(),
    };
    if available == 0 {
        return Err(PiiCatcherError::Validation(format!(
            "No {} detector selected for a {} scan",
            match scan_type {
                ScanType::Metadata => "metadata",
                ScanType::Data => "datum",
            },
            scan_type.as_str()
        )));
    }
    Ok(())
}
