//! Mask-based row filtering for record batches
//!
//! A [`BatchFilter`] computes a boolean mask over a batch. Masks are combined
//! with [`AndFilter`] and applied once, so a batch is only copied a single
//! time however many fields are restricted.

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::BooleanArray;
use arrow::compute::{and, filter_record_batch as arrow_filter_record_batch};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use crate::error::Result;

/// Keep the rows of `batch` where `mask` is true
///
/// Null mask entries drop the row.
///
/// # Errors
/// Returns an error if the mask length does not match the batch
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(ArrowError::InvalidArgumentError(format!(
            "Mask has {} entries for a batch of {} rows",
            mask.len(),
            batch.num_rows()
        ))
        .into());
    }

    Ok(arrow_filter_record_batch(batch, mask)?)
}

/// A row predicate over record batches
pub trait BatchFilter: std::fmt::Debug {
    /// Mask of the rows to keep, one entry per row of `batch`
    fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray>;

    /// Rows of `batch` accepted by [`BatchFilter::evaluate`]
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mask = self.evaluate(batch)?;
        filter_record_batch(batch, &mask)
    }

    /// Columns the filter reads
    fn required_columns(&self) -> HashSet<String>;
}

/// Accepts every row
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAllFilter;

impl BatchFilter for IncludeAllFilter {
    fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        Ok(BooleanArray::from(vec![true; batch.num_rows()]))
    }

    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        Ok(batch.clone())
    }

    fn required_columns(&self) -> HashSet<String> {
        HashSet::new()
    }
}

/// Conjunction of filters; with no filters it accepts every row
#[derive(Debug, Clone, Default)]
pub struct AndFilter {
    filters: Vec<Arc<dyn BatchFilter + Send + Sync>>,
}

impl AndFilter {
    #[must_use]
    pub fn new(filters: Vec<Arc<dyn BatchFilter + Send + Sync>>) -> Self {
        Self { filters }
    }

    /// Add a filter to the conjunction
    pub fn push(&mut self, filter: Arc<dyn BatchFilter + Send + Sync>) {
        self.filters.push(filter);
    }

    /// Number of combined filters
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl BatchFilter for AndFilter {
    fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        self.filters
            .iter()
            .try_fold(IncludeAllFilter.evaluate(batch)?, |combined, filter| {
                let mask = filter.evaluate(batch)?;
                Ok(and(&combined, &mask)?)
            })
    }

    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        if self.filters.is_empty() {
            return IncludeAllFilter.filter(batch);
        }
        let mask = self.evaluate(batch)?;
        filter_record_batch(batch, &mask)
    }

    fn required_columns(&self) -> HashSet<String> {
        self.filters
            .iter()
            .flat_map(|f| f.required_columns())
            .collect()
    }
}
