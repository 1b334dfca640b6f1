use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ple::sales::model::{
    AggregationResult, CellValue, PivotAxis, PivotRow, PivotTable, Product, SalesRecord,
    SeasonalityCell, TrendPoint, YearTotals,
};

/// Ordering applied to pivot rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowOrder {
    /// Order in which a key first appears in the input.
    #[default]
    FirstSeen,
    /// Key name, ascending.
    Name,
    /// Row total, descending; ties keep first-seen order.
    TotalDescending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateOptions {
    pub pivot_axis: PivotAxis,
    pub row_order: RowOrder,
}

/// Sums units per year.
pub fn totals_by_year(records: &[SalesRecord]) -> YearTotals {
    let mut totals = YearTotals::new();
    for record in records {
        *totals.entry(record.year).or_insert(0.0) += record.units;
    }
    totals
}

/// Computes grouped totals, year-over-year deltas, and the pivot table.
///
/// `baseline` holds the per-year totals of the reference dataset; a year `Y`
/// gets a delta only when `Y - 1` is present there.
pub fn compute(
    records: &[SalesRecord],
    baseline: &YearTotals,
    options: &AggregateOptions,
) -> AggregationResult {
    let mut totals_by_region = BTreeMap::new();
    let mut totals_by_product = BTreeMap::new();
    for record in records {
        *totals_by_region
            .entry(record.region.clone())
            .or_insert(0.0) += record.units;
        *totals_by_product.entry(record.product).or_insert(0.0) += record.units;
    }

    let totals_by_year = totals_by_year(records);
    let yoy_delta = yoy_delta(&totals_by_year, baseline);
    let pivot = pivot(records, options.pivot_axis, options.row_order);

    AggregationResult {
        totals_by_region,
        totals_by_product,
        totals_by_year,
        yoy_delta,
        pivot,
    }
}

/// Signed change of each year's total against the baseline's prior year.
pub fn yoy_delta(totals: &YearTotals, baseline: &YearTotals) -> BTreeMap<i32, f64> {
    totals
        .iter()
        .filter_map(|(&year, &units)| {
            let prior = year.checked_sub(1)?;
            baseline.get(&prior).map(|&previous| (year, units - previous))
        })
        .collect()
}

/// Builds a pivot with rows keyed by `axis` and one column per year.
pub fn pivot(records: &[SalesRecord], axis: PivotAxis, order: RowOrder) -> PivotTable {
    let years: Vec<i32> = records
        .iter()
        .map(|record| record.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut keys: Vec<String> = Vec::new();
    let mut sums: BTreeMap<String, BTreeMap<i32, f64>> = BTreeMap::new();
    for record in records {
        let key = match axis {
            PivotAxis::Product => record.product.label().to_string(),
            PivotAxis::Region => record.region.clone(),
        };
        let row = sums.entry(key.clone()).or_insert_with(|| {
            keys.push(key);
            BTreeMap::new()
        });
        *row.entry(record.year).or_insert(0.0) += record.units;
    }

    let mut rows: Vec<PivotRow> = keys
        .into_iter()
        .map(|key| {
            let row_sums = sums.remove(&key).unwrap_or_default();
            let cells = years
                .iter()
                .map(|year| {
                    let cell = row_sums
                        .get(year)
                        .map_or(CellValue::NoData, |&units| CellValue::Units(units));
                    (*year, cell)
                })
                .collect();
            PivotRow { key, cells }
        })
        .collect();

    match order {
        RowOrder::FirstSeen => {}
        RowOrder::Name => rows.sort_by(|lhs, rhs| lhs.key.cmp(&rhs.key)),
        RowOrder::TotalDescending => {
            rows.sort_by(|lhs, rhs| rhs.total().total_cmp(&lhs.total()));
        }
    }

    PivotTable { axis, years, rows }
}

/// Average units per product, year, and month over monthly records.
pub fn seasonality(records: &[SalesRecord]) -> Vec<SeasonalityCell> {
    let mut buckets: BTreeMap<(Product, i32, u32), (f64, u32)> = BTreeMap::new();
    for record in records {
        let Some(month) = record.month else {
            continue;
        };
        let bucket = buckets
            .entry((record.product, record.year, month))
            .or_insert((0.0, 0));
        bucket.0 += record.units;
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(|((product, year, month), (sum, count))| SeasonalityCell {
            product,
            year,
            month,
            average_units: sum / f64::from(count),
        })
        .collect()
}

/// Monthly units per product and region, ordered by year, month, product,
/// then region. Records without a month are skipped.
pub fn monthly_trend(records: &[SalesRecord]) -> Vec<TrendPoint> {
    let mut sums: BTreeMap<(i32, u32, Product, &str), f64> = BTreeMap::new();
    for record in records {
        if let Some(month) = record.month {
            *sums
                .entry((record.year, month, record.product, record.region.as_str()))
                .or_default() += record.units;
        }
    }

    sums.into_iter()
        .map(|((year, month, product, region), units)| TrendPoint {
            year,
            month,
            product,
            region: region.to_string(),
            units,
        })
        .collect()
}
