use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use tracing::{info, instrument};

use crate::ple::sales::error::{Result, SalesError};
use crate::ple::sales::io::{csv_write, excel_write, json_write};
use crate::ple::sales::report;
use crate::ple::sales::session::DashboardView;

/// What an export writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Pivot table as CSV.
    Pivot,
    /// Filtered rows as CSV.
    Records,
    /// Every view as an Excel workbook.
    Report,
    /// KPIs and aggregates as JSON.
    Json,
}

impl ExportKind {
    /// Guesses the export from the output file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(ExportKind::Pivot),
            "xlsx" => Some(ExportKind::Report),
            "json" => Some(ExportKind::Json),
            _ => None,
        }
    }

    /// Uses `explicit` when given, otherwise guesses from `path`.
    pub fn resolve(explicit: Option<Self>, path: &Path) -> Result<Self> {
        explicit
            .or_else(|| Self::from_path(path))
            .ok_or_else(|| SalesError::UnsupportedExport(path.display().to_string()))
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportKind::Pivot => write!(f, "pivot"),
            ExportKind::Records => write!(f, "records"),
            ExportKind::Report => write!(f, "report"),
            ExportKind::Json => write!(f, "json"),
        }
    }
}

/// Writes the pivot table of a selection as CSV.
#[instrument(level = "info", skip_all, fields(output = %output.display()))]
pub fn pivot_to_csv(view: &DashboardView, output: &Path) -> Result<()> {
    let table = report::pivot_table(&view.aggregates.pivot);
    info!(row_count = table.rows.len(), "writing pivot table");
    csv_write::write_table(output, &table)
}

/// Writes the filtered rows of a selection as CSV.
#[instrument(level = "info", skip_all, fields(output = %output.display()))]
pub fn records_to_csv(view: &DashboardView, output: &Path) -> Result<()> {
    let table = report::records_table(&view.records);
    info!(row_count = table.rows.len(), "writing filtered rows");
    csv_write::write_table(output, &table)
}

/// Writes every view of a selection into an Excel workbook.
#[instrument(level = "info", skip_all, fields(output = %output.display()))]
pub fn report_to_excel(view: &DashboardView, output: &Path) -> Result<()> {
    let workbook = view.report();
    info!(sheet_count = workbook.tables.len(), "writing report workbook");
    excel_write::write_workbook(output, &workbook)
}

/// Writes KPIs, aggregates, and unmapped region labels as JSON.
#[instrument(level = "info", skip_all, fields(output = %output.display()))]
pub fn summary_to_json(
    view: &DashboardView,
    unmapped_regions: &BTreeSet<String>,
    output: &Path,
) -> Result<()> {
    json_write::write_summary(output, &view.summary_document(unmapped_regions))
}

/// Dispatches to the writer for `kind`.
pub fn export(
    view: &DashboardView,
    unmapped_regions: &BTreeSet<String>,
    output: &Path,
    kind: ExportKind,
) -> Result<()> {
    match kind {
        ExportKind::Pivot => pivot_to_csv(view, output),
        ExportKind::Records => records_to_csv(view, output),
        ExportKind::Report => report_to_excel(view, output),
        ExportKind::Json => summary_to_json(view, unmapped_regions, output),
    }
}
