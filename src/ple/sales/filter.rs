use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ple::sales::model::{Product, SalesRecord};

/// Inclusive range of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// A range that admits every year.
    pub fn unbounded() -> Self {
        Self {
            min: i32::MIN,
            max: i32::MAX,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Record selection. Empty product or region sets select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub products: BTreeSet<Product>,
    pub regions: BTreeSet<String>,
    pub year_range: YearRange,
    pub include_world_aggregate: bool,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(mut self, products: impl IntoIterator<Item = Product>) -> Self {
        self.products = products.into_iter().collect();
        self
    }

    pub fn with_regions<S: Into<String>>(mut self, regions: impl IntoIterator<Item = S>) -> Self {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_year_range(mut self, min: i32, max: i32) -> Self {
        self.year_range = YearRange::new(min, max);
        self
    }

    pub fn with_world_aggregate(mut self, include: bool) -> Self {
        self.include_world_aggregate = include;
        self
    }

    /// Same selection with the year range widened to every year.
    pub fn without_year_range(&self) -> Self {
        Self {
            year_range: YearRange::unbounded(),
            ..self.clone()
        }
    }

    pub fn matches(&self, record: &SalesRecord) -> bool {
        (self.products.is_empty() || self.products.contains(&record.product))
            && (self.regions.is_empty() || self.regions.contains(&record.region))
            && self.year_range.contains(record.year)
            && (self.include_world_aggregate || !record.is_world_aggregate())
    }
}

/// Returns the records selected by `spec`, in input order.
pub fn apply(records: &[SalesRecord], spec: &FilterSpec) -> Vec<SalesRecord> {
    records
        .iter()
        .filter(|record| spec.matches(record))
        .cloned()
        .collect()
}

/// Returns the records selected by `spec` ignoring its year range.
///
/// This is the reference set for year-over-year deltas: a prior year that
/// falls outside the selected range still provides a baseline.
pub fn baseline(records: &[SalesRecord], spec: &FilterSpec) -> Vec<SalesRecord> {
    apply(records, &spec.without_year_range())
}
