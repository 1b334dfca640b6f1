use std::collections::BTreeSet;
use std::io::{Read, Seek};
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::ple::sales::aggregate::{self, AggregateOptions};
use crate::ple::sales::alias::AliasTable;
use crate::ple::sales::error::Result;
use crate::ple::sales::filter::{self, FilterSpec};
use crate::ple::sales::io::excel_read;
use crate::ple::sales::io::json_write::SummaryDocument;
use crate::ple::sales::kpi::{self, KpiSummary};
use crate::ple::sales::model::{AggregationResult, Dataset, SalesRecord, SeasonalityCell, TrendPoint};
use crate::ple::sales::report::{self, WorkbookData};

/// A loaded dataset together with the alias table used to load it.
///
/// Replacing the dataset is all-or-nothing: a failed load leaves the
/// previously loaded records in place.
#[derive(Debug, Clone)]
pub struct Session {
    aliases: AliasTable,
    dataset: Dataset,
}

/// Everything derived from one filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub records: Vec<SalesRecord>,
    pub aggregates: AggregationResult,
    pub kpis: KpiSummary,
    pub seasonality: Vec<SeasonalityCell>,
    pub trend: Vec<TrendPoint>,
}

impl Session {
    pub fn new(dataset: Dataset, aliases: AliasTable) -> Self {
        Self { aliases, dataset }
    }

    /// Loads the workbook at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path, aliases: AliasTable) -> Result<Self> {
        let dataset = excel_read::load_path(path, &aliases)?;
        info!(record_count = dataset.records.len(), "dataset loaded");
        Ok(Self::new(dataset, aliases))
    }

    /// Loads a workbook from an uploaded byte stream.
    #[instrument(level = "info", skip_all)]
    pub fn from_reader<R: Read + Seek>(reader: R, aliases: AliasTable) -> Result<Self> {
        let dataset = excel_read::load_reader(reader, &aliases)?;
        info!(record_count = dataset.records.len(), "dataset loaded");
        Ok(Self::new(dataset, aliases))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Replaces the dataset with the workbook at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn replace_from_path(&mut self, path: &Path) -> Result<()> {
        match excel_read::load_path(path, &self.aliases) {
            Ok(dataset) => {
                self.swap(dataset);
                Ok(())
            }
            Err(error) => {
                warn!(%error, "replacement load failed; keeping current dataset");
                Err(error.into())
            }
        }
    }

    /// Replaces the dataset with a workbook read from `reader`.
    #[instrument(level = "info", skip_all)]
    pub fn replace_from_reader<R: Read + Seek>(&mut self, reader: R) -> Result<()> {
        match excel_read::load_reader(reader, &self.aliases) {
            Ok(dataset) => {
                self.swap(dataset);
                Ok(())
            }
            Err(error) => {
                warn!(%error, "replacement load failed; keeping current dataset");
                Err(error.into())
            }
        }
    }

    fn swap(&mut self, dataset: Dataset) {
        info!(
            previous = self.dataset.records.len(),
            current = dataset.records.len(),
            "dataset replaced"
        );
        self.dataset = dataset;
    }

    /// Every region in the dataset, sorted by name.
    pub fn regions(&self) -> BTreeSet<String> {
        self.dataset.regions()
    }

    /// Regions selected when the caller has not chosen any: all but `World`.
    pub fn default_regions(&self) -> BTreeSet<String> {
        self.dataset
            .records
            .iter()
            .filter(|record| !record.is_world_aggregate())
            .map(|record| record.region.clone())
            .collect()
    }

    pub fn years(&self) -> BTreeSet<i32> {
        self.dataset.years()
    }

    pub fn unmapped_regions(&self) -> &BTreeSet<String> {
        &self.dataset.unmapped_regions
    }

    /// Filters the dataset and derives aggregates, KPIs, and the monthly views.
    #[instrument(level = "debug", skip_all)]
    pub fn view(&self, spec: &FilterSpec, options: &AggregateOptions) -> DashboardView {
        let all = &self.dataset.records;
        let records = filter::apply(all, spec);
        let baseline = aggregate::totals_by_year(&filter::baseline(all, spec));
        let aggregates = aggregate::compute(&records, &baseline, options);
        let kpis = kpi::summarize(&aggregates);
        let seasonality = aggregate::seasonality(&records);
        let trend = aggregate::monthly_trend(&records);
        debug!(
            selected = records.len(),
            available = all.len(),
            "selection aggregated"
        );

        DashboardView {
            records,
            aggregates,
            kpis,
            seasonality,
            trend,
        }
    }
}

impl DashboardView {
    /// True when the selection matched no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn report(&self) -> WorkbookData {
        report::build_report(
            &self.aggregates,
            &self.kpis,
            &self.records,
            &self.seasonality,
            &self.trend,
        )
    }

    pub fn summary_document<'a>(
        &'a self,
        unmapped_regions: &'a BTreeSet<String>,
    ) -> SummaryDocument<'a> {
        SummaryDocument {
            kpis: &self.kpis,
            aggregates: &self.aggregates,
            seasonality: &self.seasonality,
            trend: &self.trend,
            unmapped_regions,
        }
    }
}
