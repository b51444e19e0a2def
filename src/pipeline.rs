//! The `normalize -> filter -> aggregate` pipeline and the dashboard session
//! that reruns it whenever the selection changes.

use std::time::Instant;

use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::{ChartSet, compute_charts};
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::filter::{FilterOptions, FilterSelection, apply_filters, filter_options};
use crate::loader::load_table;
use crate::metrics::{Metrics, compute_metrics};
use crate::normalize::normalize_with_mapping;
use crate::schema::ColumnMapping;
use crate::table::CanonicalTable;

/// Everything the dashboard shows for one selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub selection: FilterSelection,
    pub metrics: Metrics,
    pub charts: ChartSet,
}

/// Metrics and charts of an already normalized table under a selection
pub fn snapshot(
    table: &CanonicalTable,
    config: &DashboardConfig,
    selection: &FilterSelection,
) -> Result<DashboardSnapshot> {
    let filtered = apply_filters(table, selection)?;
    Ok(DashboardSnapshot {
        generated_at: Utc::now(),
        selection: selection.clone(),
        metrics: compute_metrics(&filtered, config.long_stay_std_multiplier),
        charts: compute_charts(&filtered, config),
    })
}

/// Normalize a raw table, apply a selection and aggregate the result
///
/// # Arguments
/// * `raw` - The table as loaded
/// * `config` - Alias table and aggregation settings
/// * `selection` - Filters to apply after normalization
pub fn run_pipeline(
    raw: &RecordBatch,
    config: &DashboardConfig,
    selection: &FilterSelection,
) -> Result<DashboardSnapshot> {
    let (_, table) = normalize_with_mapping(raw, config)?;
    snapshot(&table, config, selection)
}

/// A loaded dataset, normalized once and re-aggregated per selection
#[derive(Debug, Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    raw: RecordBatch,
    mapping: ColumnMapping,
    table: CanonicalTable,
}

impl Dashboard {
    /// Build a session from an already loaded table
    pub fn from_raw(raw: RecordBatch, config: DashboardConfig) -> Result<Self> {
        let start = Instant::now();
        let (mapping, table) = normalize_with_mapping(&raw, &config)?;
        log::info!(
            "Normalized {} raw rows into {} records in {:?}",
            raw.num_rows(),
            table.num_rows(),
            start.elapsed()
        );
        Ok(Self {
            config,
            raw,
            mapping,
            table,
        })
    }

    /// Load the configured data file and build a session from it
    pub fn load(config: DashboardConfig) -> Result<Self> {
        let raw = load_table(&config.data_path, &config.csv)?;
        Self::from_raw(raw, config)
    }

    /// Recompute metrics and charts for a selection
    pub fn refresh(&self, selection: &FilterSelection) -> Result<DashboardSnapshot> {
        snapshot(&self.table, &self.config, selection)
    }

    /// First `rows` records of the filtered table
    pub fn preview(&self, selection: &FilterSelection, rows: usize) -> Result<CanonicalTable> {
        Ok(apply_filters(&self.table, selection)?.head(rows))
    }

    /// First `rows` records of the table as loaded, before normalization
    #[must_use]
    pub fn raw_sample(&self, rows: usize) -> RecordBatch {
        self.raw.slice(0, rows.min(self.raw.num_rows()))
    }

    /// Available choices per categorical field, over the unfiltered table
    #[must_use]
    pub fn filter_options(&self) -> FilterOptions {
        filter_options(&self.table)
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// The table as loaded
    #[must_use]
    pub fn raw(&self) -> &RecordBatch {
        &self.raw
    }

    /// How source columns were resolved to canonical fields
    #[must_use]
    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    /// The normalized, unfiltered table
    #[must_use]
    pub fn table(&self) -> &CanonicalTable {
        &self.table
    }
}
