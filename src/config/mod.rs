//! Configuration for the dashboard pipeline.
//!
//! The alias table is the main user-editable surface. Everything else has a
//! default that matches the stock dashboard.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::util::safe_read_to_string;
use crate::error::{DashboardError, Result};
use crate::schema::AliasTable;

/// Environment variable overriding the default data path
pub const DATA_PATH_ENV: &str = "DISCHARGE_DATA_PATH";

/// Data path used when neither the config nor the environment sets one
pub const DEFAULT_DATA_PATH: &str = "data/hospital_data.csv";

/// Default number of diagnoses in the top-N chart
pub const DEFAULT_TOP_N: usize = 15;

/// Default number of histogram bins for length of stay
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Default number of rows in the table preview
pub const DEFAULT_PREVIEW_ROWS: usize = 100;

/// Default batch size for CSV reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Options for the CSV reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field delimiter
    pub delimiter: char,
    /// Whether the first line holds column names
    pub has_header: bool,
    /// Rows per Arrow batch while reading
    pub batch_size: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_header: true,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Configuration for the dashboard pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Input file (CSV or Parquet)
    pub data_path: PathBuf,
    /// Aliases per canonical field
    pub aliases: AliasTable,
    /// Number of diagnoses kept in the top-N chart
    pub top_n_diagnoses: usize,
    /// Number of bins the length of stay histogram uses
    pub histogram_bins: usize,
    /// Standard deviations above the mean that mark a long stay
    pub long_stay_std_multiplier: f64,
    /// Replacement for missing text values
    pub unknown_label: String,
    /// Rows shown in the table preview
    pub preview_rows: usize,
    /// CSV reader options
    pub csv: CsvOptions,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let data_path = std::env::var_os(DATA_PATH_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_PATH), PathBuf::from);

        Self {
            data_path,
            aliases: AliasTable::default(),
            top_n_diagnoses: DEFAULT_TOP_N,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            long_stay_std_multiplier: 1.0,
            unknown_label: "Unknown".to_string(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            csv: CsvOptions::default(),
        }
    }
}

impl DashboardConfig {
    /// Parse a configuration from JSON, filling missing keys with defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = safe_read_to_string(path, "reading dashboard configuration")?;
        let config = Self::from_json_str(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Builder-style override of the data path
    #[must_use]
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    /// Builder-style override of the alias table
    #[must_use]
    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.histogram_bins == 0 {
            return Err(DashboardError::Config(
                "histogram_bins must be at least 1".to_string(),
            ));
        }
        if self.csv.batch_size == 0 {
            return Err(DashboardError::Config(
                "csv.batch_size must be at least 1".to_string(),
            ));
        }
        if !self.csv.delimiter.is_ascii() {
            return Err(DashboardError::Config(format!(
                "csv.delimiter must be a single ASCII character, got {:?}",
                self.csv.delimiter
            )));
        }
        if !self.long_stay_std_multiplier.is_finite() {
            return Err(DashboardError::Config(
                "long_stay_std_multiplier must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
