//! Type coercion for canonical columns.
//!
//! Every function here is total: values that cannot be coerced become null
//! (numeric columns) or the unknown label (text columns). Arrow errors are
//! only returned for internal failures, never for bad cell contents.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, LargeStringArray, StringArray, new_null_array};
use arrow::compute::{can_cast_types, cast};
use arrow::datatypes::DataType;

use crate::error::Result;

/// Cohort labels, lowest first
pub const AGE_GROUP_LABELS: [&str; 5] = ["0-17", "18-35", "36-50", "51-65", "65+"];

/// Upper bounds (inclusive) of every cohort but the last
const AGE_GROUP_UPPER_BOUNDS: [f64; 4] = [17.0, 35.0, 50.0, 65.0];

/// Identifies whether a data type is a string type
#[must_use]
pub const fn is_string(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
    )
}

/// Parse a single cell as a number, trimming surrounding whitespace
///
/// Empty, unparseable and NaN values give `None`.
#[must_use]
pub fn parse_numeric(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
}

/// Coerce any column to `Float64`
///
/// String columns are parsed cell by cell with [`parse_numeric`]. Numeric
/// columns are cast. Columns of any other type that Arrow cannot cast become
/// all-null.
pub fn to_numeric(array: &ArrayRef) -> Result<ArrayRef> {
    let data_type = array.data_type();

    let values: Float64Array = if is_string(data_type) {
        let strings = as_utf8(array)?;
        strings
            .iter()
            .map(|v| v.and_then(parse_numeric))
            .collect()
    } else if can_cast_types(data_type, &DataType::Float64) {
        let casted = cast(array, &DataType::Float64)?;
        let floats = casted
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| arrow::error::ArrowError::CastError("expected Float64".into()))?;
        floats
            .iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect()
    } else {
        log::debug!("Column of type {data_type} cannot be read as numbers, treating as missing");
        return Ok(new_null_array(&DataType::Float64, array.len()));
    };

    Ok(Arc::new(values))
}

/// Coerce any column to non-null `Utf8`
///
/// Nulls and blank strings become `unknown`. Columns Arrow cannot render as
/// text become entirely `unknown`.
pub fn to_text(array: &ArrayRef, unknown: &str) -> Result<ArrayRef> {
    if !is_string(array.data_type()) && !can_cast_types(array.data_type(), &DataType::Utf8) {
        log::debug!(
            "Column of type {} cannot be read as text, treating as missing",
            array.data_type()
        );
        let filled: StringArray = std::iter::repeat_n(Some(unknown), array.len()).collect();
        return Ok(Arc::new(filled));
    }

    let nan = nan_positions(array)?.unwrap_or_default();
    let strings = as_utf8(array)?;
    let filled: StringArray = strings
        .iter()
        .enumerate()
        .map(|(idx, v)| match v {
            Some(s) if !s.trim().is_empty() && !nan.get(idx).copied().unwrap_or(false) => {
                Some(s)
            }
            _ => Some(unknown),
        })
        .collect();

    Ok(Arc::new(filled))
}

/// View any column as text, casting non-string types
///
/// Returns `None` for columns Arrow cannot render as text. Nulls stay null.
#[must_use]
pub fn text_values(array: &ArrayRef) -> Option<StringArray> {
    if !is_string(array.data_type()) && !can_cast_types(array.data_type(), &DataType::Utf8) {
        return None;
    }
    match as_utf8(array) {
        Ok(strings) => Some(strings),
        Err(e) => {
            log::debug!("Column of type {} not readable as text: {e}", array.data_type());
            None
        }
    }
}

/// NaN cells of a float column; `None` for any other type
fn nan_positions(array: &ArrayRef) -> Result<Option<Vec<bool>>> {
    if !matches!(
        array.data_type(),
        DataType::Float16 | DataType::Float32 | DataType::Float64
    ) {
        return Ok(None);
    }

    let casted = cast(array, &DataType::Float64)?;
    let floats = casted
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| arrow::error::ArrowError::CastError("expected Float64".into()))?;
    Ok(Some(floats.iter().map(|v| v.is_some_and(f64::is_nan)).collect()))
}

/// Age cohort label for a single age
///
/// Intervals are right-closed with an inclusive lower bound of zero and no
/// upper bound on the last cohort. Negative or NaN ages have no cohort.
#[must_use]
pub fn age_group(age: f64) -> Option<&'static str> {
    if age.is_nan() || age < 0.0 {
        return None;
    }

    let idx = AGE_GROUP_UPPER_BOUNDS
        .iter()
        .position(|upper| age <= *upper)
        .unwrap_or(AGE_GROUP_UPPER_BOUNDS.len());
    Some(AGE_GROUP_LABELS[idx])
}

/// Derive the cohort column from a `Float64` age column
pub fn age_groups(ages: &ArrayRef) -> Result<ArrayRef> {
    let ages = ages
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| arrow::error::ArrowError::CastError("age must be Float64".into()))?;

    let groups: StringArray = ages.iter().map(|a| a.and_then(age_group)).collect();
    Ok(Arc::new(groups))
}

/// View a column as a `StringArray`, casting when it is not plain `Utf8`
fn as_utf8(array: &ArrayRef) -> Result<StringArray> {
    if let Some(strings) = array.as_any().downcast_ref::<StringArray>() {
        return Ok(strings.clone());
    }
    if let Some(large) = array.as_any().downcast_ref::<LargeStringArray>() {
        return Ok(large.iter().collect());
    }

    let casted = cast(array, &DataType::Utf8)?;
    casted
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| arrow::error::ArrowError::CastError("expected Utf8".into()).into())
}
