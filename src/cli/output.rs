//! Terminal rendering for CLI commands
//!
//! Tables use `comfy-table`; JSON output is pretty-printed `serde_json`.

use crate::core::api::ScanReport;
use crate::core::output::ReportRow;
use crate::domain::Task;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};

const REPORT_HEADERS: [&str; 4] = ["schema", "table", "column", "pii_type"];

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

/// Table of report rows
pub fn report_table(rows: &[ReportRow]) -> Table {
    let mut table = new_table(&REPORT_HEADERS);
    for row in rows {
        table.add_row(row.cells().to_vec());
    }
    table
}

/// Table of scan tasks, oldest first
pub fn tasks_table(tasks: &[Task]) -> Table {
    let mut table = new_table(&["id", "status", "recorded_at", "message"]);
    for task in tasks {
        let status = if task.is_success() {
            Cell::new("success").fg(Color::Green)
        } else {
            Cell::new("failed").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(task.id),
            status,
            Cell::new(task.updated_at.format("%Y-%m-%d %H:%M:%S%.6f UTC")),
            Cell::new(&task.message),
        ]);
    }
    table
}

/// Render a scan report for the terminal
pub fn render_report(report: &ScanReport) -> anyhow::Result<String> {
    Ok(match report {
        ScanReport::Tabular(rows) => report_table(rows).to_string(),
        ScanReport::Dict(dict) => serde_json::to_string_pretty(dict)?,
    })
}
