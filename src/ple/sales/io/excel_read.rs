use std::collections::BTreeSet;
use std::io::{Read, Seek};
use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::{debug, instrument, warn};

use crate::ple::sales::alias::{AliasTable, Resolved};
use crate::ple::sales::error::LoadError;
use crate::ple::sales::model::{Dataset, Product, SalesRecord};

/// Zero-based physical row holding the column headers. Row 0 is a caption.
pub const HEADER_ROW: u32 = 1;

/// First header label of the monthly layout.
pub const MONTH_LABEL: &str = "Month";

const YEAR_BOUNDS: std::ops::RangeInclusive<i32> = 1900..=2999;

/// Column arrangement detected from a sheet's header row.
#[derive(Debug, Clone, PartialEq)]
enum SheetLayout {
    /// Region labels down the first column, one unit column per year.
    Yearly {
        region_col: usize,
        year_cols: Vec<(usize, i32)>,
    },
    /// Month dates under a `Month` header, one unit column per region.
    Monthly {
        month_col: usize,
        region_cols: Vec<(usize, String)>,
    },
}

/// Loads both product sheets from the workbook at `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_path(path: &Path, aliases: &AliasTable) -> Result<Dataset, LoadError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    load_workbook(&mut workbook, aliases)
}

/// Loads both product sheets from an in-memory or streamed `.xlsx` workbook.
#[instrument(level = "info", skip_all)]
pub fn load_reader<R: Read + Seek>(reader: R, aliases: &AliasTable) -> Result<Dataset, LoadError> {
    let mut workbook = Xlsx::new(reader)?;
    load_workbook(&mut workbook, aliases)
}

fn load_workbook<R: Read + Seek>(
    workbook: &mut Xlsx<R>,
    aliases: &AliasTable,
) -> Result<Dataset, LoadError> {
    let sheet_names = workbook.sheet_names();
    for product in Product::ALL {
        let sheet = product.sheet_name();
        if !sheet_names.iter().any(|name| name == sheet) {
            return Err(LoadError::MissingSheet(sheet.to_string()));
        }
    }

    let mut dataset = Dataset::default();
    for product in Product::ALL {
        let range = read_required_sheet(workbook, product.sheet_name())?;
        let records = ingest_sheet(&range, product, aliases, &mut dataset.unmapped_regions)?;
        debug!(
            sheet = product.sheet_name(),
            record_count = records.len(),
            "sheet ingested"
        );
        dataset.records.extend(records);
    }

    if !dataset.unmapped_regions.is_empty() {
        warn!(
            labels = ?dataset.unmapped_regions,
            "region labels without an alias entry were kept as written"
        );
    }

    Ok(dataset)
}

fn read_required_sheet<R: Read + Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<DataType>, LoadError> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| LoadError::MissingSheet(name.to_string()))?;
    Ok(range_result?)
}

fn ingest_sheet(
    range: &Range<DataType>,
    product: Product,
    aliases: &AliasTable,
    unmapped: &mut BTreeSet<String>,
) -> Result<Vec<SalesRecord>, LoadError> {
    let sheet = product.sheet_name();
    let (start_row, _) = range
        .start()
        .ok_or_else(|| malformed(sheet, "sheet is empty"))?;
    if start_row > HEADER_ROW {
        return Err(malformed(sheet, "header row 2 is blank"));
    }

    let mut rows = range.rows().skip((HEADER_ROW - start_row) as usize);
    let header = rows
        .next()
        .ok_or_else(|| malformed(sheet, "header row 2 is missing"))?;
    let layout = detect_layout(sheet, header)?;

    let mut records = Vec::new();
    match layout {
        SheetLayout::Yearly {
            region_col,
            year_cols,
        } => {
            for row in rows {
                let label = cell_to_string(row.get(region_col));
                if label.trim().is_empty() {
                    continue;
                }
                let region = resolve_region(aliases, &label, unmapped);
                for &(col_idx, year) in &year_cols {
                    if let Some(units) = parse_units(row.get(col_idx)) {
                        records.push(SalesRecord::new(product, region.clone(), year, units));
                    }
                }
            }
        }
        SheetLayout::Monthly {
            month_col,
            region_cols,
        } => {
            let regions: Vec<(usize, String)> = region_cols
                .into_iter()
                .map(|(col_idx, label)| (col_idx, resolve_region(aliases, &label, unmapped)))
                .collect();
            for row in rows {
                let Some(date) = parse_month(row.get(month_col)) else {
                    continue;
                };
                for (col_idx, region) in &regions {
                    if let Some(units) = parse_units(row.get(*col_idx)) {
                        records.push(SalesRecord::monthly(
                            product,
                            region.clone(),
                            date.year(),
                            date.month(),
                            units,
                        ));
                    }
                }
            }
        }
    }

    Ok(records)
}

fn detect_layout(sheet: &str, header: &[DataType]) -> Result<SheetLayout, LoadError> {
    let labels: Vec<String> = header
        .iter()
        .map(|cell| cell_to_string(Some(cell)).trim().to_string())
        .collect();

    let first_col = labels
        .iter()
        .position(|label| !label.is_empty())
        .ok_or_else(|| malformed(sheet, "header row has no labels"))?;

    let year_cols: Vec<(usize, i32)> = header
        .iter()
        .enumerate()
        .skip(first_col + 1)
        .filter_map(|(col_idx, cell)| parse_year(cell).map(|year| (col_idx, year)))
        .collect();
    if !year_cols.is_empty() {
        return Ok(SheetLayout::Yearly {
            region_col: first_col,
            year_cols,
        });
    }

    if !labels[first_col].eq_ignore_ascii_case(MONTH_LABEL) {
        return Err(malformed(
            sheet,
            &format!("no year columns after '{}'", labels[first_col]),
        ));
    }

    let region_cols: Vec<(usize, String)> = labels
        .iter()
        .enumerate()
        .skip(first_col + 1)
        .filter(|(_, label)| !label.is_empty())
        .map(|(col_idx, label)| (col_idx, label.clone()))
        .collect();
    if region_cols.is_empty() {
        return Err(malformed(sheet, "no region columns after 'Month'"));
    }

    Ok(SheetLayout::Monthly {
        month_col: first_col,
        region_cols,
    })
}

fn resolve_region(aliases: &AliasTable, label: &str, unmapped: &mut BTreeSet<String>) -> String {
    match aliases.resolve(label) {
        Resolved::Canonical(name) => name,
        Resolved::Unmapped(name) => {
            unmapped.insert(name.clone());
            name
        }
    }
}

fn malformed(sheet: &str, reason: &str) -> LoadError {
    LoadError::MalformedHeader {
        sheet: sheet.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_year(cell: &DataType) -> Option<i32> {
    let year = match cell {
        DataType::Int(value) => i32::try_from(*value).ok()?,
        DataType::Float(value) if value.fract() == 0.0 => *value as i32,
        DataType::String(value) => value.trim().parse::<i32>().ok()?,
        _ => return None,
    };
    YEAR_BOUNDS.contains(&year).then_some(year)
}

fn parse_units(cell: Option<&DataType>) -> Option<f64> {
    let value = match cell? {
        DataType::Float(value) => *value,
        DataType::Int(value) => *value as f64,
        DataType::String(value) => value.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn parse_month(cell: Option<&DataType>) -> Option<NaiveDate> {
    match cell? {
        DataType::Empty => None,
        DataType::String(text) => parse_date_text(text),
        other => other.as_date(),
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }
    NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("01 {text}"), "%d %b %Y"))
        .ok()
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> DataType {
        DataType::String(value.to_string())
    }

    #[test]
    fn year_headers_accept_numbers_and_text() {
        assert_eq!(parse_year(&DataType::Float(2022.0)), Some(2022));
        assert_eq!(parse_year(&DataType::Int(2019)), Some(2019));
        assert_eq!(parse_year(&text(" 2023 ")), Some(2023));
        assert_eq!(parse_year(&text("Total")), None);
        assert_eq!(parse_year(&DataType::Float(12.5)), None);
        assert_eq!(parse_year(&DataType::Int(42)), None);
    }

    #[test]
    fn blank_and_invalid_units_are_no_data() {
        assert_eq!(parse_units(Some(&DataType::Float(12.0))), Some(12.0));
        assert_eq!(parse_units(Some(&text(" 42 "))), Some(42.0));
        assert_eq!(parse_units(Some(&DataType::Float(0.0))), Some(0.0));
        assert_eq!(parse_units(Some(&DataType::Empty)), None);
        assert_eq!(parse_units(Some(&text("n/a"))), None);
        assert_eq!(parse_units(Some(&DataType::Float(-3.0))), None);
        assert_eq!(parse_units(None), None);
    }

    #[test]
    fn month_cells_accept_serials_and_text() {
        let january = NaiveDate::from_ymd_opt(2019, 1, 1);
        assert_eq!(parse_month(Some(&DataType::DateTime(43466.0))), january);
        assert_eq!(parse_month(Some(&text("2019-01-01"))), january);
        assert_eq!(parse_month(Some(&text("2019-01-01 00:00:00"))), january);
        assert_eq!(parse_month(Some(&text("2019-01"))), january);
        assert_eq!(parse_month(Some(&text("Jan 2019"))), january);
        assert_eq!(parse_month(Some(&text("Total"))), None);
    }

    #[test]
    fn header_with_years_is_yearly() {
        let header = vec![
            DataType::Empty,
            text("Region"),
            DataType::Float(2022.0),
            text("2023"),
            text("Total"),
        ];
        assert_eq!(
            detect_layout("Tractor Unit Sales", &header).unwrap(),
            SheetLayout::Yearly {
                region_col: 1,
                year_cols: vec![(2, 2022), (3, 2023)],
            }
        );
    }

    #[test]
    fn header_without_years_is_monthly() {
        let header = vec![text("Month"), text("SA"), DataType::Empty, text("Eur")];
        assert_eq!(
            detect_layout("Mower Unit Sales", &header).unwrap(),
            SheetLayout::Monthly {
                month_col: 0,
                region_cols: vec![(1, "SA".to_string()), (3, "Eur".to_string())],
            }
        );
    }

    #[test]
    fn header_with_single_label_is_malformed() {
        let header = vec![text("Region"), DataType::Empty];
        assert!(matches!(
            detect_layout("Mower Unit Sales", &header),
            Err(LoadError::MalformedHeader { .. })
        ));
        assert!(matches!(
            detect_layout("Mower Unit Sales", &[DataType::Empty]),
            Err(LoadError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn labels_without_years_or_month_are_malformed() {
        let header = vec![text("Region"), text("FY22"), text("FY23")];
        assert!(matches!(
            detect_layout("Tractor Unit Sales", &header),
            Err(LoadError::MalformedHeader { .. })
        ));
        let month_only = vec![text("month"), DataType::Empty];
        assert!(matches!(
            detect_layout("Tractor Unit Sales", &month_only),
            Err(LoadError::MalformedHeader { .. })
        ));
    }
}
