//! Scan engine
//!
//! Drives detectors over the items of a generator and writes annotations
//! back to the catalog. A second, independently built generator over the
//! same arguments is consumed first to size the work for progress logging.
//!
//! Errors from detectors, generators and the catalog are returned as is.

use crate::adapters::catalog::Catalog;
use crate::core::detectors::{DatumDetector, MetadataDetector};
use crate::core::generators::{ColumnGenerator, DataGenerator};
use crate::domain::{Column, PiiType, Result};
use crate::{log_scan_complete, log_scan_progress};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Plugin recorded on a "no PII" annotation: every detector consulted
fn consulted<'d>(names: impl Iterator<Item = &'d str>) -> String {
    names.collect::<Vec<_>>().join(",")
}

/// Classify columns from their metadata
///
/// Every yielded column is annotated: with the first detector hit, or as
/// "no PII" under the names of the detectors consulted.
pub async fn metadata_scan(
    catalog: &dyn Catalog,
    detectors: &[Arc<dyn MetadataDetector>],
    work_generator: ColumnGenerator<'_>,
    mut generator: ColumnGenerator<'_>,
) -> Result<()> {
    let total = work_generator.count().await?;
    let no_pii_plugin = consulted(detectors.iter().map(|d| d.name()));
    let started = Instant::now();

    let mut visited: u64 = 0;
    let mut labeled: u64 = 0;

    while let Some((schema, table, column)) = generator.next().await? {
        visited += 1;
        log_scan_progress!(visited, total);

        match first_metadata_match(detectors, &column)? {
            Some((pii_type, plugin)) => {
                tracing::debug!(
                    schema = %schema.name,
                    table = %table.name,
                    column = %column.name,
                    %pii_type,
                    plugin,
                    "Column labeled"
                );
                catalog
                    .set_column_pii_type(&column, Some(pii_type), plugin)
                    .await?;
                labeled += 1;
            }
            None => {
                catalog
                    .set_column_pii_type(&column, None, &no_pii_plugin)
                    .await?;
            }
        }
    }

    log_scan_complete!(visited, labeled, started.elapsed());
    Ok(())
}

fn first_metadata_match<'d>(
    detectors: &'d [Arc<dyn MetadataDetector>],
    column: &Column,
) -> Result<Option<(PiiType, &'d str)>> {
    for detector in detectors {
        if let Some(pii_type) = detector.detect(column)? {
            return Ok(Some((pii_type, detector.name())));
        }
    }
    Ok(None)
}

/// Classify columns from their values
///
/// Null values are skipped without touching the column. Once a column is
/// labeled its remaining values are skipped. When the stream ends, every
/// column that produced a non-null value but was never labeled is written as
/// "no PII"; columns that only produced nulls keep their annotation.
pub async fn data_scan(
    catalog: &dyn Catalog,
    detectors: &[Arc<dyn DatumDetector>],
    work_generator: DataGenerator<'_>,
    mut generator: DataGenerator<'_>,
) -> Result<()> {
    let total = work_generator.count().await?;
    let no_pii_plugin = consulted(detectors.iter().map(|d| d.name()));
    let started = Instant::now();

    let mut visited: u64 = 0;
    let mut labeled_ids = HashSet::new();
    let mut unlabeled: Vec<Column> = Vec::new();

    while let Some((schema, table, column, value)) = generator.next().await? {
        visited += 1;
        log_scan_progress!(visited, total);

        let Some(value) = value else {
            continue;
        };
        if labeled_ids.contains(&column.id) {
            continue;
        }

        match first_datum_match(detectors, &column, &value)? {
            Some((pii_type, plugin)) => {
                tracing::debug!(
                    schema = %schema.name,
                    table = %table.name,
                    column = %column.name,
                    %pii_type,
                    plugin,
                    "Column labeled"
                );
                catalog
                    .set_column_pii_type(&column, Some(pii_type), plugin)
                    .await?;
                labeled_ids.insert(column.id);
                unlabeled.retain(|c| c.id != column.id);
            }
            None => {
                if !unlabeled.iter().any(|c| c.id == column.id) {
                    unlabeled.push(column);
                }
            }
        }
    }

    for column in &unlabeled {
        catalog
            .set_column_pii_type(column, None, &no_pii_plugin)
            .await?;
    }

    log_scan_complete!(visited, labeled_ids.len() as u64, started.elapsed());
    Ok(())
}

fn first_datum_match<'d>(
    detectors: &'d [Arc<dyn DatumDetector>],
    column: &Column,
    value: &str,
) -> Result<Option<(PiiType, &'d str)>> {
    for detector in detectors {
        if let Some(pii_type) = detector.detect(column, value)? {
            return Ok(Some((pii_type, detector.name())));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::InMemoryCatalog;
    use crate::adapters::source::SqliteConnector;
    use crate::core::dbinfo::SqliteInfo;
    use crate::core::detectors::DetectorRegistry;
    use crate::core::generators::{column_generator, data_generator, Sampling, ScanFilters};
    use crate::core::test_support::{sqlite_fixture, sync_fixture};
    use crate::domain::{PiiCatcherError, Source, Table};

    struct Failing;

    impl MetadataDetector for Failing {
        fn name(&self) -> &str {
            "Failing"
        }

        fn detect(&self, column: &Column) -> Result<Option<PiiType>> {
            Err(PiiCatcherError::Detector {
                detector: "Failing".to_string(),
                message: format!("cannot classify {}", column.name),
            })
        }
    }

    type Annotation = (String, Option<PiiType>, Option<String>);

    async fn annotations(catalog: &InMemoryCatalog, source: &Source) -> Vec<Annotation> {
        let mut out = Vec::new();
        for schema in catalog.search_schemas(source, "%").await.unwrap() {
            let schema = catalog.get_schema_by_id(schema.id).await.unwrap();
            let mut tables = catalog.search_tables(&schema, "%").await.unwrap();
            tables.sort_by(|a, b| a.name.cmp(&b.name));
            for table in tables {
                let table: Table = catalog.get_table_by_id(table.id).await.unwrap();
                for column in catalog.get_columns_for_table(&table, None).await.unwrap() {
                    out.push((
                        format!("{}.{}", table.name, column.name),
                        column.pii_type,
                        column.pii_plugin,
                    ));
                }
            }
        }
        out
    }

    async fn run_metadata(
        catalog: &InMemoryCatalog,
        source: &Source,
        detectors: &[Arc<dyn MetadataDetector>],
    ) -> Result<()> {
        let filters = ScanFilters::default();
        metadata_scan(
            catalog,
            detectors,
            column_generator(catalog, source, &filters, None).await?,
            column_generator(catalog, source, &filters, None).await?,
        )
        .await
    }

    async fn run_data(
        catalog: &InMemoryCatalog,
        connector: &SqliteConnector,
        source: &Source,
    ) -> Result<()> {
        let registry = DetectorRegistry::with_builtin()?;
        let filters = ScanFilters::default();
        let sampling = Sampling::default();
        data_scan(
            catalog,
            &registry.datum_detectors(),
            data_generator(catalog, connector, &SqliteInfo, source, &filters, None, sampling).await?,
            data_generator(catalog, connector, &SqliteInfo, source, &filters, None, sampling).await?,
        )
        .await
    }

    #[tokio::test]
    async fn test_metadata_scan_labels_and_marks_no_pii() {
        let (_dir, path) = sqlite_fixture(&[
            "CREATE TABLE full_pii (name TEXT, state TEXT)",
            "CREATE TABLE no_pii (a TEXT, b TEXT)",
        ])
        .await;
        let catalog = InMemoryCatalog::new();
        let source = sync_fixture(&catalog, &SqliteConnector::new(&path)).await;
        let registry = DetectorRegistry::with_builtin().unwrap();

        run_metadata(&catalog, &source, &registry.metadata_detectors())
            .await
            .unwrap();

        let plugin = Some("ColumnNameRegexDetector".to_string());
        assert_eq!(
            annotations(&catalog, &source).await,
            vec![
                ("full_pii.name".to_string(), Some(PiiType::Person), plugin.clone()),
                ("full_pii.state".to_string(), Some(PiiType::Address), plugin.clone()),
                ("no_pii.a".to_string(), None, plugin.clone()),
                ("no_pii.b".to_string(), None, plugin),
            ]
        );
    }

    #[tokio::test]
    async fn test_detector_error_propagates() {
        let (_dir, path) = sqlite_fixture(&["CREATE TABLE t (name TEXT)"]).await;
        let catalog = InMemoryCatalog::new();
        let source = sync_fixture(&catalog, &SqliteConnector::new(&path)).await;

        let detectors: Vec<Arc<dyn MetadataDetector>> = vec![Arc::new(Failing)];
        let err = run_metadata(&catalog, &source, &detectors).await.unwrap_err();
        assert!(matches!(err, PiiCatcherError::Detector { .. }));
        assert_eq!(annotations(&catalog, &source).await[0].2, None);
    }

    #[tokio::test]
    async fn test_data_scan_labels_from_values() {
        let (_dir, path) = sqlite_fixture(&[
            "CREATE TABLE contacts (id INTEGER, phone TEXT, note TEXT, empty TEXT)",
            "INSERT INTO contacts VALUES (1, '917-908-2234', 'abc', NULL), (2, NULL, 'hello', NULL)",
        ])
        .await;
        let connector = SqliteConnector::new(&path);
        let catalog = InMemoryCatalog::new();
        let source = sync_fixture(&catalog, &connector).await;

        run_data(&catalog, &connector, &source).await.unwrap();

        let plugin = Some("DatumRegexDetector".to_string());
        assert_eq!(
            annotations(&catalog, &source).await,
            vec![
                ("contacts.id".to_string(), None, None),
                ("contacts.phone".to_string(), Some(PiiType::Phone), plugin.clone()),
                ("contacts.note".to_string(), None, plugin),
                ("contacts.empty".to_string(), None, None),
            ]
        );
    }

    #[tokio::test]
    async fn test_null_values_keep_existing_annotation() {
        let (_dir, path) = sqlite_fixture(&[
            "CREATE TABLE contacts (email TEXT)",
            "INSERT INTO contacts VALUES (NULL)",
        ])
        .await;
        let connector = SqliteConnector::new(&path);
        let catalog = InMemoryCatalog::new();
        let source = sync_fixture(&catalog, &connector).await;

        let schema = catalog.add_schema(&source, "").await.unwrap();
        let table = catalog.add_table(&schema, "contacts").await.unwrap();
        let column = catalog.add_column(&table, "email", "TEXT", 0).await.unwrap();
        let labeled = catalog
            .set_column_pii_type(&column, Some(PiiType::Email), "DatumRegexDetector")
            .await
            .unwrap();

        run_data(&catalog, &connector, &source).await.unwrap();

        let after = catalog.get_columns_for_table(&table, None).await.unwrap();
        assert_eq!(after, vec![labeled]);
    }
}
