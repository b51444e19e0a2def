//! Inclusion-list filters over the categorical canonical columns.
//!
//! An empty selection never restricts: picking nothing for a field means
//! "no filter on that field", not "show nothing".

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, BooleanArray};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter::core::{AndFilter, BatchFilter};
use crate::schema::adapters::text_values;
use crate::schema::{AGE_GROUP_COLUMN, CanonicalField};
use crate::table::CanonicalTable;

/// Categorical columns that can be filtered on
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Facility,
    County,
    Diagnosis,
    Severity,
    AgeGroup,
}

impl FilterField {
    /// All filterable fields, in sidebar order
    pub const ALL: [Self; 5] = [
        Self::Facility,
        Self::County,
        Self::Diagnosis,
        Self::Severity,
        Self::AgeGroup,
    ];

    /// Column name in the canonical table
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Facility => CanonicalField::Facility.column_name(),
            Self::County => CanonicalField::County.column_name(),
            Self::Diagnosis => CanonicalField::Diagnosis.column_name(),
            Self::Severity => CanonicalField::Severity.column_name(),
            Self::AgeGroup => AGE_GROUP_COLUMN,
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Keeps rows whose column value is one of a set of strings
///
/// Null values never match. An empty value set keeps every row.
#[derive(Debug, Clone)]
pub struct InclusionFilter {
    column: String,
    values: HashSet<String>,
}

impl InclusionFilter {
    /// Create a filter on `column` accepting `values`
    pub fn new<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl BatchFilter for InclusionFilter {
    fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        if self.values.is_empty() {
            return Ok(BooleanArray::from(vec![true; batch.num_rows()]));
        }

        let column = batch.column_by_name(&self.column).ok_or_else(|| {
            ArrowError::SchemaError(format!("Filter column '{}' not found", self.column))
        })?;
        let Some(strings) = text_values(column) else {
            log::warn!(
                "Filter column '{}' of type {} cannot be read as text; no rows match",
                self.column,
                column.data_type()
            );
            return Ok(BooleanArray::from(vec![false; batch.num_rows()]));
        };

        Ok(strings
            .iter()
            .map(|v| Some(v.is_some_and(|s| self.values.contains(s))))
            .collect())
    }

    fn required_columns(&self) -> HashSet<String> {
        HashSet::from([self.column.clone()])
    }
}

/// Selected values per categorical field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSelection {
    selections: BTreeMap<FilterField, BTreeSet<String>>,
}

impl FilterSelection {
    /// A selection that restricts nothing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`FilterSelection::select`]
    #[must_use]
    pub fn with<I, S>(mut self, field: FilterField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select(field, values);
        self
    }

    /// Replace the selected values for a field
    pub fn select<I, S>(&mut self, field: FilterField, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selections
            .insert(field, values.into_iter().map(Into::into).collect());
    }

    /// Selected values for a field (empty means unrestricted)
    #[must_use]
    pub fn selected(&self, field: FilterField) -> Option<&BTreeSet<String>> {
        self.selections.get(&field).filter(|v| !v.is_empty())
    }

    /// Whether no field is restricted
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.selections.values().all(BTreeSet::is_empty)
    }

    /// Build the combined filter for a table
    ///
    /// Fields with an empty selection are skipped, as are fields the table
    /// does not have.
    #[must_use]
    pub fn to_filter(&self, table: &CanonicalTable) -> AndFilter {
        let mut combined = AndFilter::default();
        for field in FilterField::ALL {
            let Some(values) = self.selected(field) else {
                continue;
            };
            if table.column(field.column_name()).is_none() {
                log::debug!("Ignoring filter on {field}: column not present");
                continue;
            }
            combined.push(Arc::new(InclusionFilter::new(
                field.column_name(),
                values.iter().cloned(),
            )));
        }
        combined
    }
}

/// Restrict a table to the rows matching a selection
///
/// The input table is left untouched.
pub fn apply_filters(table: &CanonicalTable, selection: &FilterSelection) -> Result<CanonicalTable> {
    let filter = selection.to_filter(table);
    if filter.is_empty() {
        return Ok(table.clone());
    }

    let filtered = filter.filter(table.batch())?;
    log::debug!(
        "Filters on {} field(s) kept {} of {} rows",
        filter.len(),
        filtered.num_rows(),
        table.num_rows()
    );
    Ok(CanonicalTable::new(filtered))
}

/// Sorted distinct values per categorical field present in the table
pub type FilterOptions = BTreeMap<FilterField, Vec<String>>;

/// Collect the choices available for each categorical field
#[must_use]
pub fn filter_options(table: &CanonicalTable) -> FilterOptions {
    FilterField::ALL
        .into_iter()
        .filter_map(|field| {
            let column = text_values(table.column(field.column_name())?)?;
            let distinct: BTreeSet<&str> = column.iter().flatten().collect();
            Some((field, distinct.into_iter().map(str::to_string).collect()))
        })
        .collect()
}
