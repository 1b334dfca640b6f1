mod common;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use calamine::{Reader, Xlsx, open_workbook};
use common::{fixture_aliases, write_workbook};
use ple_sales::SalesError;
use ple_sales::aggregate::{AggregateOptions, RowOrder};
use ple_sales::export::{self, ExportKind};
use ple_sales::filter::FilterSpec;
use ple_sales::model::{PivotAxis, Product, TrendPoint};
use ple_sales::report::{SEASONALITY_SHEET, TREND_SHEET};
use ple_sales::session::Session;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn yearly_session(dir: &Path) -> Session {
    let path = write_workbook(
        dir,
        "ple.xlsx",
        &[common::tractor_yearly(), common::mower_yearly()],
    );
    Session::open(&path, fixture_aliases()).expect("session opened")
}

fn region_options() -> AggregateOptions {
    AggregateOptions {
        pivot_axis: PivotAxis::Region,
        row_order: RowOrder::Name,
    }
}

#[test]
fn default_view_excludes_world_aggregate() {
    let temp_dir = tempdir().expect("temporary directory");
    let session = yearly_session(temp_dir.path());

    let view = session.view(&FilterSpec::new(), &AggregateOptions::default());

    assert_eq!(view.kpis.total_units, 305.0);
    assert!(!view.aggregates.totals_by_region.contains_key("World"));
    assert_eq!(
        view.aggregates.totals_by_product,
        BTreeMap::from([(Product::Tractor, 275.0), (Product::Mower, 30.0)])
    );
    assert_eq!(view.aggregates.yoy_delta, BTreeMap::from([(2023, 75.0)]));
    assert!(session.regions().contains("World"));
    assert!(!session.default_regions().contains("World"));
}

#[test]
fn region_selection_without_prior_year_has_no_yoy() {
    let temp_dir = tempdir().expect("temporary directory");
    let session = yearly_session(temp_dir.path());

    let view = session.view(
        &FilterSpec::new().with_regions(["EMEA"]),
        &AggregateOptions::default(),
    );

    assert_eq!(view.aggregates.totals_by_year, BTreeMap::from([(2023, 50.0)]));
    assert!(view.aggregates.yoy_delta.is_empty());
    assert_eq!(view.kpis.latest_year_delta, None);
}

#[test]
fn year_range_keeps_prior_year_as_baseline() {
    let temp_dir = tempdir().expect("temporary directory");
    let session = yearly_session(temp_dir.path());

    let view = session.view(
        &FilterSpec::new()
            .with_products([Product::Tractor])
            .with_year_range(2023, 2023),
        &AggregateOptions::default(),
    );

    assert_eq!(view.aggregates.totals_by_year, BTreeMap::from([(2023, 170.0)]));
    assert_eq!(view.aggregates.yoy_delta, BTreeMap::from([(2023, 65.0)]));
}

#[test]
fn empty_selection_is_not_an_error() {
    let temp_dir = tempdir().expect("temporary directory");
    let session = yearly_session(temp_dir.path());

    let view = session.view(
        &FilterSpec::new().with_year_range(1990, 1995),
        &AggregateOptions::default(),
    );

    assert!(view.is_empty());
    assert!(view.aggregates.pivot.is_empty());
    assert_eq!(view.kpis.tractor_share, None);
}

#[test]
fn failed_replacement_keeps_current_dataset() {
    let temp_dir = tempdir().expect("temporary directory");
    let mut session = yearly_session(temp_dir.path());
    let before = session.dataset().clone();

    let broken = write_workbook(temp_dir.path(), "broken.xlsx", &[common::mower_yearly()]);
    let error = session.replace_from_path(&broken).unwrap_err();

    assert!(matches!(error, SalesError::Load(_)));
    assert_eq!(session.dataset(), &before);

    let monthly = write_workbook(
        temp_dir.path(),
        "monthly.xlsx",
        &[common::mower_monthly(), common::tractor_monthly()],
    );
    session.replace_from_path(&monthly).expect("replacement loaded");
    assert!(session.dataset().records.iter().all(|record| record.month.is_some()));
}

#[test]
fn monthly_view_includes_seasonality() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = write_workbook(
        temp_dir.path(),
        "monthly.xlsx",
        &[common::mower_monthly(), common::tractor_monthly()],
    );
    let session = Session::open(&path, Default::default()).expect("session opened");

    let view = session.view(
        &FilterSpec::new().with_products([Product::Mower]),
        &AggregateOptions::default(),
    );

    let january_2019 = view
        .seasonality
        .iter()
        .find(|cell| cell.year == 2019 && cell.month == 1)
        .expect("January 2019 present");
    assert_eq!(january_2019.average_units, 15.0);
    assert_eq!(view.aggregates.yoy_delta, BTreeMap::from([(2020, -20.0)]));
}

#[test]
fn monthly_view_traces_units_per_region() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = write_workbook(
        temp_dir.path(),
        "monthly.xlsx",
        &[common::mower_monthly(), common::tractor_monthly()],
    );
    let session = Session::open(&path, Default::default()).expect("session opened");

    let view = session.view(
        &FilterSpec::new().with_products([Product::Mower]),
        &AggregateOptions::default(),
    );

    let point = |year, month, region: &str, units| TrendPoint {
        year,
        month,
        product: Product::Mower,
        region: region.to_string(),
        units,
    };
    assert_eq!(
        view.trend,
        vec![
            point(2019, 1, "Europe", 20.0),
            point(2019, 1, "South America", 10.0),
            point(2019, 2, "South America", 5.0),
            point(2020, 1, "Europe", 8.0),
            point(2020, 1, "South America", 7.0),
        ]
    );

    let sheets: Vec<String> = view
        .report()
        .tables
        .into_iter()
        .map(|table| table.sheet_name)
        .collect();
    assert!(sheets.ends_with(&[SEASONALITY_SHEET.to_string(), TREND_SHEET.to_string()]));
}

#[test]
fn pivot_csv_leaves_missing_cells_blank() {
    let temp_dir = tempdir().expect("temporary directory");
    let session = yearly_session(temp_dir.path());
    let view = session.view(&FilterSpec::new(), &region_options());

    let output = temp_dir.path().join("pivot.csv");
    let kind = ExportKind::resolve(None, &output).expect("kind guessed");
    export::export(&view, session.unmapped_regions(), &output, kind).expect("pivot exported");

    let written = fs::read_to_string(&output).expect("CSV read");
    assert_eq!(
        written,
        "Region,2022,2023\nEMEA,,50\nEurope,10,20\nNorth America,105,120\n"
    );
}

#[test]
fn records_csv_lists_filtered_rows() {
    let temp_dir = tempdir().expect("temporary directory");
    let session = yearly_session(temp_dir.path());
    let view = session.view(
        &FilterSpec::new().with_regions(["EMEA"]),
        &AggregateOptions::default(),
    );

    let output = temp_dir.path().join("rows.csv");
    export::records_to_csv(&view, &output).expect("rows exported");

    let written = fs::read_to_string(&output).expect("CSV read");
    assert_eq!(written, "Product,Region,Year,Month,Units\nTractor,EMEA,2023,,50\n");
}

#[test]
fn excel_report_contains_every_view() {
    let temp_dir = tempdir().expect("temporary directory");
    let session = yearly_session(temp_dir.path());
    let view = session.view(&FilterSpec::new(), &region_options());

    let output = temp_dir.path().join("report.xlsx");
    export::export(&view, session.unmapped_regions(), &output, ExportKind::Report)
        .expect("report exported");

    let workbook: Xlsx<_> = open_workbook(&output).expect("report opened");
    let names = workbook.sheet_names().to_vec();
    for expected in ["Summary", "By Region", "By Product", "By Year", "Pivot", "Filtered Data"] {
        assert!(
            names.iter().any(|name| name == expected),
            "missing sheet {expected}"
        );
    }
}

#[test]
fn json_summary_reports_kpis_and_unmapped_labels() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = write_workbook(
        temp_dir.path(),
        "ple.xlsx",
        &[common::tractor_yearly(), common::mower_yearly()],
    );
    let session = Session::open(&path, Default::default()).expect("session opened");
    let view = session.view(&FilterSpec::new(), &AggregateOptions::default());

    let output = temp_dir.path().join("summary.json");
    export::export(&view, session.unmapped_regions(), &output, ExportKind::Json)
        .expect("summary exported");

    let written = fs::read_to_string(&output).expect("JSON read");
    let parsed: serde_json::Value = serde_json::from_str(&written).expect("JSON parsed");
    assert_eq!(parsed["kpis"]["total_units"], serde_json::json!(305.0));
    assert_eq!(
        parsed["unmapped_regions"],
        serde_json::json!(["EMEA", "North America", "ncsa"])
    );
}

#[test]
fn unknown_export_extension_is_rejected() {
    let result = ExportKind::resolve(None, Path::new("summary.txt"));
    assert!(matches!(result, Err(SalesError::UnsupportedExport(_))));
    assert_eq!(
        ExportKind::resolve(Some(ExportKind::Records), Path::new("rows.txt")).ok(),
        Some(ExportKind::Records)
    );
}
