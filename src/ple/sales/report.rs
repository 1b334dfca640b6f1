use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::ple::sales::kpi::KpiSummary;
use crate::ple::sales::model::{
    AggregationResult, PivotAxis, PivotTable, SalesRecord, SeasonalityCell, TrendPoint,
};

/// Sheet name storing the headline figures.
pub const SUMMARY_SHEET: &str = "Summary";
/// Sheet name storing the pivot table.
pub const PIVOT_SHEET: &str = "Pivot";
/// Sheet name storing the filtered rows.
pub const RECORDS_SHEET: &str = "Filtered Data";
/// Sheet name storing units per region.
pub const REGION_SHEET: &str = "By Region";
/// Sheet name storing units per product.
pub const PRODUCT_SHEET: &str = "By Product";
/// Sheet name storing units and year-over-year change per year.
pub const YEAR_SHEET: &str = "By Year";
/// Sheet name storing average monthly units.
pub const SEASONALITY_SHEET: &str = "Seasonality";
/// Sheet name storing units per month, product, and region.
pub const TREND_SHEET: &str = "Trend";

/// A value in an exported table. Missing data stays empty, never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportCell {
    Text(String),
    Number(f64),
    Empty,
}

impl ReportCell {
    pub fn text(value: impl Into<String>) -> Self {
        ReportCell::Text(value.into())
    }
}

impl From<Option<f64>> for ReportCell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(ReportCell::Empty, ReportCell::Number)
    }
}

impl fmt::Display for ReportCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportCell::Text(value) => f.write_str(value),
            ReportCell::Number(value) => write!(f, "{value}"),
            ReportCell::Empty => Ok(()),
        }
    }
}

/// A table that will be materialised as a sheet or a CSV file.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<ReportCell>>,
}

/// Represents all tables of an exported report workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

/// Pivot rows with one column per year.
pub fn pivot_table(pivot: &PivotTable) -> SheetTable {
    let key_column = match pivot.axis {
        PivotAxis::Product => "Product",
        PivotAxis::Region => "Region",
    };
    let mut columns = Vec::with_capacity(pivot.years.len() + 1);
    columns.push(key_column.to_string());
    columns.extend(pivot.years.iter().map(i32::to_string));

    let rows = pivot
        .rows
        .iter()
        .map(|row| {
            let mut cells = Vec::with_capacity(columns.len());
            cells.push(ReportCell::text(&row.key));
            for year in &pivot.years {
                cells.push(row.cells.get(year).and_then(|cell| cell.units()).into());
            }
            cells
        })
        .collect();

    SheetTable {
        sheet_name: PIVOT_SHEET.to_string(),
        columns,
        rows,
    }
}

/// One row per filtered record.
pub fn records_table(records: &[SalesRecord]) -> SheetTable {
    let rows = records
        .iter()
        .map(|record| {
            vec![
                ReportCell::text(record.product.label()),
                ReportCell::text(&record.region),
                ReportCell::Number(f64::from(record.year)),
                record.month.map(f64::from).into(),
                ReportCell::Number(record.units),
            ]
        })
        .collect();

    SheetTable {
        sheet_name: RECORDS_SHEET.to_string(),
        columns: strings(&["Product", "Region", "Year", "Month", "Units"]),
        rows,
    }
}

pub fn summary_table(summary: &KpiSummary) -> SheetTable {
    let top_region = summary
        .top_region
        .as_ref()
        .map_or(ReportCell::Empty, |top| ReportCell::text(&top.region));
    let rows = vec![
        vec![ReportCell::text("Total units"), ReportCell::Number(summary.total_units)],
        vec![
            ReportCell::text("Latest year"),
            summary.latest_year.map(f64::from).into(),
        ],
        vec![
            ReportCell::text("Latest year units"),
            summary.latest_year_units.into(),
        ],
        vec![
            ReportCell::text("Latest year change"),
            summary.latest_year_delta.into(),
        ],
        vec![ReportCell::text("Top region"), top_region],
        vec![
            ReportCell::text("Tractor share (%)"),
            summary.tractor_share.into(),
        ],
    ];

    SheetTable {
        sheet_name: SUMMARY_SHEET.to_string(),
        columns: strings(&["Metric", "Value"]),
        rows,
    }
}

pub fn seasonality_table(cells: &[SeasonalityCell]) -> SheetTable {
    let rows = cells
        .iter()
        .map(|cell| {
            vec![
                ReportCell::text(cell.product.label()),
                ReportCell::Number(f64::from(cell.year)),
                ReportCell::Number(f64::from(cell.month)),
                ReportCell::Number(cell.average_units),
            ]
        })
        .collect();

    SheetTable {
        sheet_name: SEASONALITY_SHEET.to_string(),
        columns: strings(&["Product", "Year", "Month", "Average Units"]),
        rows,
    }
}

pub fn trend_table(points: &[TrendPoint]) -> SheetTable {
    let rows = points
        .iter()
        .map(|point| {
            vec![
                ReportCell::Number(f64::from(point.year)),
                ReportCell::Number(f64::from(point.month)),
                ReportCell::text(point.product.label()),
                ReportCell::text(&point.region),
                ReportCell::Number(point.units),
            ]
        })
        .collect();

    SheetTable {
        sheet_name: TREND_SHEET.to_string(),
        columns: strings(&["Year", "Month", "Product", "Region", "Units"]),
        rows,
    }
}

/// Bundles every view of an aggregation into one workbook.
pub fn build_report(
    result: &AggregationResult,
    summary: &KpiSummary,
    records: &[SalesRecord],
    seasonality: &[SeasonalityCell],
    trend: &[TrendPoint],
) -> WorkbookData {
    let by_region = totals_table(
        REGION_SHEET,
        "Region",
        result
            .totals_by_region
            .iter()
            .map(|(region, units)| (region.clone(), *units)),
    );
    let by_product = totals_table(
        PRODUCT_SHEET,
        "Product",
        result
            .totals_by_product
            .iter()
            .map(|(product, units)| (product.label().to_string(), *units)),
    );

    let mut tables = vec![
        summary_table(summary),
        by_region,
        by_product,
        year_table(&result.totals_by_year, &result.yoy_delta),
        pivot_table(&result.pivot),
        records_table(records),
    ];
    if !seasonality.is_empty() {
        tables.push(seasonality_table(seasonality));
    }
    if !trend.is_empty() {
        tables.push(trend_table(trend));
    }

    WorkbookData { tables }
}

fn totals_table(
    sheet_name: &str,
    key_column: &str,
    totals: impl Iterator<Item = (String, f64)>,
) -> SheetTable {
    SheetTable {
        sheet_name: sheet_name.to_string(),
        columns: vec![key_column.to_string(), "Units".to_string()],
        rows: totals
            .map(|(key, units)| vec![ReportCell::Text(key), ReportCell::Number(units)])
            .collect(),
    }
}

fn year_table(totals: &BTreeMap<i32, f64>, yoy_delta: &BTreeMap<i32, f64>) -> SheetTable {
    let rows = totals
        .iter()
        .map(|(year, units)| {
            vec![
                ReportCell::Number(f64::from(*year)),
                ReportCell::Number(*units),
                yoy_delta.get(year).copied().into(),
            ]
        })
        .collect();

    SheetTable {
        sheet_name: YEAR_SHEET.to_string(),
        columns: strings(&["Year", "Units", "Change vs Prior Year"]),
        rows,
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
