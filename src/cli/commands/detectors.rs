//! Detectors command implementation

use super::{build_registry, load_config, report_failure};
use clap::Args;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};

/// Arguments for the detectors command
#[derive(Args, Debug)]
pub struct DetectorsArgs {}

impl DetectorsArgs {
    /// List built-in and configured detectors in registration order
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => return Ok(report_failure("Failed to load configuration", &e)),
        };

        let registry = match build_registry(&config) {
            Ok(r) => r,
            Err(e) => return Ok(report_failure("Failed to build detector registry", &e)),
        };

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("name").fg(Color::Cyan),
                Cell::new("kind").fg(Color::Cyan),
            ]);
        for detector in registry.get_all() {
            table.add_row(vec![detector.name(), detector.kind().as_str()]);
        }
        println!("{table}");
        Ok(0)
    }
}
