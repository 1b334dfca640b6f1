use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::ple::sales::error::Result;
use crate::ple::sales::kpi::KpiSummary;
use crate::ple::sales::model::{AggregationResult, SeasonalityCell, TrendPoint};

/// JSON document combining the aggregates of one selection.
#[derive(Debug, Serialize)]
pub struct SummaryDocument<'a> {
    pub kpis: &'a KpiSummary,
    pub aggregates: &'a AggregationResult,
    pub seasonality: &'a [SeasonalityCell],
    pub trend: &'a [TrendPoint],
    pub unmapped_regions: &'a BTreeSet<String>,
}

pub fn to_json_string(document: &SummaryDocument<'_>) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

pub fn write_summary(path: &Path, document: &SummaryDocument<'_>) -> Result<()> {
    fs::write(path, to_json_string(document)?)?;
    Ok(())
}
