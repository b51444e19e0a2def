//! The normalized discharge table.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;

use crate::schema::{AGE_GROUP_COLUMN, CanonicalField};

/// A record batch whose canonical columns have been renamed and coerced
///
/// Numeric canonical columns are `Float64`, text canonical columns and the
/// age cohort are `Utf8`. Canonical fields that were not found in the source
/// are simply absent.
#[derive(Debug, Clone)]
pub struct CanonicalTable {
    batch: RecordBatch,
}

impl CanonicalTable {
    /// Wrap an already normalized batch
    #[must_use]
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// An empty table with no columns
    #[must_use]
    pub fn empty() -> Self {
        Self::new(RecordBatch::new_empty(Arc::new(Schema::empty())))
    }

    /// Underlying record batch
    #[must_use]
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Consume the table, returning the record batch
    #[must_use]
    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    /// Number of rows
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Column names, in table order
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Whether a canonical field is present
    #[must_use]
    pub fn has_field(&self, field: CanonicalField) -> bool {
        self.column(field.column_name()).is_some()
    }

    /// Whether the age cohort column is present
    #[must_use]
    pub fn has_age_group(&self) -> bool {
        self.column(AGE_GROUP_COLUMN).is_some()
    }

    /// Column by name
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// Numeric canonical column, if present
    #[must_use]
    pub fn numeric(&self, field: CanonicalField) -> Option<&Float64Array> {
        self.column(field.column_name())?
            .as_any()
            .downcast_ref::<Float64Array>()
    }

    /// Text column by name (canonical text fields or `age_group`)
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&StringArray> {
        self.column(name)?.as_any().downcast_ref::<StringArray>()
    }

    /// Non-missing values of a numeric field, in row order
    #[must_use]
    pub fn values(&self, field: CanonicalField) -> Option<Vec<f64>> {
        self.numeric(field).map(|a| a.iter().flatten().collect())
    }

    /// First `rows` rows of the table
    #[must_use]
    pub fn head(&self, rows: usize) -> Self {
        let len = rows.min(self.num_rows());
        Self::new(self.batch.slice(0, len))
    }
}

impl From<CanonicalTable> for RecordBatch {
    fn from(table: CanonicalTable) -> Self {
        table.batch
    }
}

impl AsRef<RecordBatch> for CanonicalTable {
    fn as_ref(&self) -> &RecordBatch {
        &self.batch
    }
}

