use serde::{Deserialize, Serialize};

use crate::ple::sales::model::{AggregationResult, Product};

/// Headline figures for the current selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_units: f64,
    pub latest_year: Option<i32>,
    pub latest_year_units: Option<f64>,
    /// Change of the latest year against its baseline prior year.
    pub latest_year_delta: Option<f64>,
    pub top_region: Option<RegionTotal>,
    /// Tractor units as a percentage of all units; absent when nothing sold.
    pub tractor_share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionTotal {
    pub region: String,
    pub units: f64,
}

pub fn summarize(result: &AggregationResult) -> KpiSummary {
    let total_units: f64 = result.totals_by_year.values().sum();
    let latest = result.totals_by_year.last_key_value();

    let mut top_region: Option<RegionTotal> = None;
    for (region, &units) in &result.totals_by_region {
        if top_region.as_ref().is_none_or(|best| units > best.units) {
            top_region = Some(RegionTotal {
                region: region.clone(),
                units,
            });
        }
    }

    let tractor_units = result
        .totals_by_product
        .get(&Product::Tractor)
        .copied()
        .unwrap_or(0.0);
    let tractor_share = (total_units > 0.0).then(|| tractor_units / total_units * 100.0);

    KpiSummary {
        total_units,
        latest_year: latest.map(|(&year, _)| year),
        latest_year_units: latest.map(|(_, &units)| units),
        latest_year_delta: latest.and_then(|(year, _)| result.yoy_delta.get(year).copied()),
        top_region,
        tractor_share,
    }
}
