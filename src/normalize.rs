//! Schema normalization: rename, coerce, derive cohorts, drop rows without
//! a length of stay.

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::compute::is_not_null;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::filter::core::filter_record_batch;
use crate::schema::adapters::{age_groups, to_numeric, to_text};
use crate::schema::{AGE_GROUP_COLUMN, CanonicalField, ColumnMapping, FieldKind, resolve_columns};
use crate::table::CanonicalTable;

/// Normalize a raw table into the canonical schema
///
/// # Arguments
/// * `raw` - The table as loaded, with arbitrary column names and types
/// * `config` - Supplies the alias table and the unknown label
///
/// # Returns
/// The canonical table
pub fn normalize(raw: &RecordBatch, config: &DashboardConfig) -> Result<CanonicalTable> {
    normalize_with_mapping(raw, config).map(|(_, table)| table)
}

/// Normalize a raw table and also return the resolved column mapping
pub fn normalize_with_mapping(
    raw: &RecordBatch,
    config: &DashboardConfig,
) -> Result<(ColumnMapping, CanonicalTable)> {
    let schema = raw.schema();
    let source_names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    let mapping = resolve_columns(&source_names, &config.aliases);

    for (field, source) in mapping.resolved() {
        log::debug!("Mapped column '{source}' -> {field}");
    }

    let derive_age_group = mapping.is_resolved(CanonicalField::Age);
    let mut reserved: HashSet<&str> = mapping.resolved().map(|(f, _)| f.column_name()).collect();
    if derive_age_group {
        reserved.insert(AGE_GROUP_COLUMN);
    }

    let mut fields = Vec::with_capacity(schema.fields().len() + 1);
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len() + 1);
    let mut age_column = None;
    let mut claimed_sources: HashSet<&str> = HashSet::new();

    for (idx, source_field) in schema.fields().iter().enumerate() {
        let name = source_field.name().as_str();
        let claimed = mapping.fields_for_source(name);

        if !claimed.is_empty() && !claimed_sources.insert(name) {
            log::warn!(
                "Dropping duplicate source column '{name}': an earlier column of that name is mapped"
            );
            continue;
        }

        if claimed.is_empty() {
            if reserved.contains(name) {
                log::warn!("Dropping source column '{name}': it collides with a canonical column");
                continue;
            }
            fields.push(source_field.as_ref().clone());
            columns.push(Arc::clone(raw.column(idx)));
            continue;
        }

        for field in claimed {
            let (data_type, nullable, array) = match field.kind() {
                FieldKind::Numeric => (DataType::Float64, true, to_numeric(raw.column(idx))?),
                FieldKind::Text => (
                    DataType::Utf8,
                    false,
                    to_text(raw.column(idx), &config.unknown_label)?,
                ),
            };
            if field == CanonicalField::Age {
                age_column = Some(Arc::clone(&array));
            }
            fields.push(Field::new(field.column_name(), data_type, nullable));
            columns.push(array);
        }
    }

    if let Some(ages) = age_column {
        fields.push(Field::new(AGE_GROUP_COLUMN, DataType::Utf8, true));
        columns.push(age_groups(&ages)?);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(raw.num_rows()));
    let renamed =
        RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)?;

    let normalized = match renamed.column_by_name(CanonicalField::LengthOfStay.column_name()) {
        Some(los) => {
            let mask = is_not_null(los.as_ref())?;
            filter_record_batch(&renamed, &mask)?
        }
        None => {
            log::info!("No length of stay column found; rows are kept as loaded");
            renamed
        }
    };

    log::info!(
        "Normalized {} rows into {} ({} dropped without length of stay)",
        raw.num_rows(),
        normalized.num_rows(),
        raw.num_rows() - normalized.num_rows()
    );

    Ok((mapping, CanonicalTable::new(normalized)))
}
