//! Inpatient discharge analytics: load a discharge table, normalize its
//! schema, filter it and derive the KPIs and chart datasets of a dashboard.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod schema;
pub mod table;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{CsvOptions, DashboardConfig};
pub use error::{DashboardError, Result};
pub use table::CanonicalTable;

// Schema
pub use schema::{AliasTable, CanonicalField, ColumnMapping, resolve_columns};

// Pipeline stages
pub use aggregate::{ChartData, ChartSet, compute_charts};
pub use filter::{FilterField, FilterSelection, apply_filters, filter_options};
pub use loader::load_table;
pub use metrics::{Metrics, compute_metrics};
pub use normalize::{normalize, normalize_with_mapping};
pub use pipeline::{Dashboard, DashboardSnapshot, run_pipeline};

// Arrow types
pub use arrow::record_batch::RecordBatch;
