use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Label of the synthetic region that carries the global total.
pub const WORLD_REGION: &str = "World";

/// Per-year unit totals, ordered by year.
pub type YearTotals = BTreeMap<i32, f64>;

/// Product line covered by the workbook. Each product owns one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Product {
    Tractor,
    Mower,
}

impl Product {
    /// All products in the order their sheets are loaded.
    pub const ALL: [Product; 2] = [Product::Mower, Product::Tractor];

    /// Name of the workbook sheet holding this product's unit sales.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Product::Tractor => "Tractor Unit Sales",
            Product::Mower => "Mower Unit Sales",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Product::Tractor => "Tractor",
            Product::Mower => "Mower",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One unit-sales observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub product: Product,
    /// Region after alias normalisation.
    pub region: String,
    pub year: i32,
    /// Calendar month (1-12) for rows loaded from a monthly sheet.
    pub month: Option<u32>,
    /// Units sold; never negative.
    pub units: f64,
}

impl SalesRecord {
    pub fn new(product: Product, region: impl Into<String>, year: i32, units: f64) -> Self {
        Self {
            product,
            region: region.into(),
            year,
            month: None,
            units,
        }
    }

    /// Creates a record for a single month of the given year.
    pub fn monthly(
        product: Product,
        region: impl Into<String>,
        year: i32,
        month: u32,
        units: f64,
    ) -> Self {
        Self {
            month: Some(month),
            ..Self::new(product, region, year, units)
        }
    }

    pub fn is_world_aggregate(&self) -> bool {
        self.region == WORLD_REGION
    }
}

/// Records produced by one successful workbook load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub records: Vec<SalesRecord>,
    /// Distinct region labels that had no entry in the alias table.
    pub unmapped_regions: BTreeSet<String>,
}

impl Dataset {
    /// Distinct regions in the dataset, sorted by name.
    pub fn regions(&self) -> BTreeSet<String> {
        self.records.iter().map(|record| record.region.clone()).collect()
    }

    /// Distinct years in the dataset, ascending.
    pub fn years(&self) -> BTreeSet<i32> {
        self.records.iter().map(|record| record.year).collect()
    }
}

/// Pivot cell content. Absent data is kept distinct from a zero total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Units(f64),
    NoData,
}

impl CellValue {
    pub fn units(self) -> Option<f64> {
        match self {
            CellValue::Units(value) => Some(value),
            CellValue::NoData => None,
        }
    }
}

/// Dimension used for pivot rows. Columns are always years.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotAxis {
    #[default]
    Product,
    Region,
}

/// A single pivot row keyed by product or region name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    pub key: String,
    /// One entry per pivot column year.
    pub cells: BTreeMap<i32, CellValue>,
}

impl PivotRow {
    pub fn total(&self) -> f64 {
        self.cells.values().filter_map(|cell| cell.units()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    pub axis: PivotAxis,
    /// Column years, ascending.
    pub years: Vec<i32>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Derived views over a filtered record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub totals_by_region: BTreeMap<String, f64>,
    pub totals_by_product: BTreeMap<Product, f64>,
    pub totals_by_year: YearTotals,
    /// Signed change against the baseline's prior year. Years without a
    /// prior year in the baseline are absent.
    pub yoy_delta: BTreeMap<i32, f64>,
    pub pivot: PivotTable,
}

/// Average monthly units for one product in one year and month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityCell {
    pub product: Product,
    pub year: i32,
    pub month: u32,
    pub average_units: f64,
}

/// Units sold by one product in one region during one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub year: i32,
    pub month: u32,
    pub product: Product,
    pub region: String,
    pub units: f64,
}
