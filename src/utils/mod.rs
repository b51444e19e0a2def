//! Logging helpers shared by the loader and the pipeline

use std::path::Path;
use std::time::Duration;

use arrow::record_batch::RecordBatch;

/// Log the start of a file operation
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{operation} {}", path.display());
}

/// Log the shape of a table produced by a file operation
///
/// # Arguments
/// * `operation` - Past-tense description, e.g. "Loaded"
/// * `path` - Source file
/// * `batch` - The resulting table
/// * `elapsed` - Time taken
pub fn log_table_complete(operation: &str, path: &Path, batch: &RecordBatch, elapsed: Duration) {
    log::info!(
        "{operation} {} rows x {} columns from {} in {elapsed:?}",
        batch.num_rows(),
        batch.num_columns(),
        path.display()
    );
}
