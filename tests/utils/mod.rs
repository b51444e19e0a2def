use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use discharge_dash::{CanonicalTable, DashboardConfig, normalize};

/// Build a raw batch where every column is nullable `Utf8`, as the CSV
/// loader produces it
#[must_use]
pub fn string_batch(columns: Vec<(&str, Vec<Option<&str>>)>) -> RecordBatch {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, _)| Field::new(*name, DataType::Utf8, true))
        .collect();
    let arrays: Vec<ArrayRef> = columns
        .into_iter()
        .map(|(_, values)| Arc::new(StringArray::from(values)) as ArrayRef)
        .collect();
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
}

/// Same as [`string_batch`] for columns without missing values
#[must_use]
pub fn dense_batch(columns: Vec<(&str, Vec<&str>)>) -> RecordBatch {
    string_batch(
        columns
            .into_iter()
            .map(|(name, values)| (name, values.into_iter().map(Some).collect()))
            .collect(),
    )
}

/// A small discharge extract using the default aliases
///
/// | Hospital | County | Diagnosis | LOS | Total_Charges | Age | Severity | Payment_Type |
#[must_use]
pub fn sample_raw() -> RecordBatch {
    string_batch(vec![
        (
            "Hospital",
            vec![
                Some("General"),
                Some("General"),
                Some("Mercy"),
                Some("Mercy"),
                Some("St. Luke"),
                Some("General"),
                None,
                Some("Mercy"),
            ],
        ),
        (
            "County",
            vec![
                Some("Kings"),
                Some("Queens"),
                Some("Kings"),
                Some("Kings"),
                Some("Bronx"),
                Some("Kings"),
                Some("Queens"),
                Some("Bronx"),
            ],
        ),
        (
            "Diagnosis",
            vec![
                Some("Sepsis"),
                Some("Pneumonia"),
                Some("Sepsis"),
                Some("Fracture"),
                Some("Pneumonia"),
                Some("Fracture"),
                Some("Sepsis"),
                Some(" "),
            ],
        ),
        (
            "LOS",
            vec![
                Some("10"),
                Some("4"),
                Some("6"),
                Some("2"),
                Some("5"),
                Some("3"),
                Some("not recorded"),
                Some("1"),
            ],
        ),
        (
            "Total_Charges",
            vec![
                Some("12000.50"),
                Some("3000"),
                None,
                Some("1500"),
                Some("4200"),
                Some("2100"),
                Some("900"),
                Some("700"),
            ],
        ),
        (
            "Age",
            vec![
                Some("72"),
                Some("35"),
                Some("17"),
                Some("36"),
                Some("-1"),
                Some("51"),
                Some("40"),
                None,
            ],
        ),
        (
            "Severity",
            vec![
                Some("Major"),
                Some("Minor"),
                Some("Major"),
                Some("Minor"),
                Some("Moderate"),
                Some("Minor"),
                Some("Major"),
                Some("Moderate"),
            ],
        ),
        (
            "Payment_Type",
            vec![
                Some("Medicare"),
                Some("Private"),
                Some("Medicaid"),
                Some("Private"),
                Some("Medicare"),
                Some("Medicare"),
                Some("Private"),
                None,
            ],
        ),
    ])
}

/// [`sample_raw`] normalized with the default configuration
#[must_use]
pub fn sample_table() -> CanonicalTable {
    normalize(&sample_raw(), &DashboardConfig::default()).unwrap()
}

/// Canonical table holding only a length of stay column
#[must_use]
pub fn los_table(values: &[f64]) -> CanonicalTable {
    let schema = Schema::new(vec![Field::new("length_of_stay", DataType::Float64, true)]);
    let los: ArrayRef = Arc::new(Float64Array::from(values.to_vec()));
    CanonicalTable::new(RecordBatch::try_new(Arc::new(schema), vec![los]).unwrap())
}

/// A raw batch with native numeric columns, as a Parquet file would hold it
#[must_use]
pub fn typed_raw() -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("Facility", DataType::Utf8, true),
        Field::new("Length_of_stay", DataType::Int64, true),
        Field::new("Charges", DataType::Float64, true),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec![Some("North"), Some("South"), None])),
        Arc::new(Int64Array::from(vec![Some(3), None, Some(7)])),
        Arc::new(Float64Array::from(vec![Some(100.0), Some(200.0), Some(f64::NAN)])),
    ];
    RecordBatch::try_new(Arc::new(schema), columns).unwrap()
}

/// A raw batch whose categorical columns are stored as numbers
///
/// `age_group` holds integer cohort codes and `Diagnosis` float codes.
#[must_use]
pub fn coded_raw() -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("LOS", DataType::Int64, true),
        Field::new("age_group", DataType::Int64, true),
        Field::new("Diagnosis", DataType::Float64, true),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![Some(2), Some(4), Some(6)])),
        Arc::new(Int64Array::from(vec![Some(1), Some(2), Some(1)])),
        Arc::new(Float64Array::from(vec![Some(f64::NAN), Some(4.0), None])),
    ];
    RecordBatch::try_new(Arc::new(schema), columns).unwrap()
}

/// Write a text file into a directory and return its path
pub fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
