//! Tabular file loading
//!
//! The input is read into a single Arrow record batch. CSV is tried first
//! and Parquet is the one alternate format; a `.parquet`/`.parq` extension
//! reverses that order. CSV columns are all read as nullable `Utf8` so that
//! mixed-type columns load and get coerced later by the normalizer.

use std::collections::HashMap;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::compute::concat_batches;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::config::CsvOptions;
use crate::error::util::{safe_open_file, try_operations};
use crate::error::{DashboardError, Result};
use crate::utils::{log_operation_start, log_table_complete};

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    /// Formats to try for a path, most likely first
    #[must_use]
    pub fn candidates(path: &Path) -> [Self; 2] {
        let is_parquet = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("parq"));

        if is_parquet {
            [Self::Parquet, Self::Csv]
        } else {
            [Self::Csv, Self::Parquet]
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}

/// Load a tabular file into one record batch
///
/// # Arguments
/// * `path` - Path to a CSV or Parquet file
/// * `options` - CSV reader options
///
/// # Returns
/// The whole file as a single record batch
///
/// # Errors
/// An IO error if the file cannot be opened, or a load error listing every
/// attempted format when none can read it
pub fn load_table(path: &Path, options: &CsvOptions) -> Result<RecordBatch> {
    // Fail early with the path attached rather than once per format
    drop(safe_open_file(path, "loading discharge records")?);

    log_operation_start("Loading", path);
    let start = Instant::now();

    let [first, second] = TableFormat::candidates(path);
    let operations = vec![
        attempt(path, first, options),
        attempt(path, second, options),
    ];

    let batch = try_operations(path, operations)?;
    log_table_complete("Loaded", path, &batch, start.elapsed());
    Ok(batch)
}

type LoadAttempt<'a> = Box<dyn FnOnce() -> Result<RecordBatch> + 'a>;

fn attempt<'a>(
    path: &'a Path,
    format: TableFormat,
    options: &'a CsvOptions,
) -> (&'static str, LoadAttempt<'a>) {
    (
        format.label(),
        Box::new(move || read_format(path, format, options)),
    )
}

fn read_format(path: &Path, format: TableFormat, options: &CsvOptions) -> Result<RecordBatch> {
    let batch = match format {
        TableFormat::Csv => read_csv(path, options),
        TableFormat::Parquet => read_parquet(path),
    };
    if let Err(e) = &batch {
        log::warn!("Could not read {} as {}: {e}", path.display(), format.label());
    }
    batch
}

/// Read a delimited text file with every column as nullable `Utf8`
pub fn read_csv(path: &Path, options: &CsvOptions) -> Result<RecordBatch> {
    let delimiter = u8::try_from(options.delimiter).map_err(|_| {
        DashboardError::Config(format!("Invalid CSV delimiter {:?}", options.delimiter))
    })?;

    let mut file = safe_open_file(path, "reading CSV file")?;
    let format = Format::default()
        .with_header(options.has_header)
        .with_delimiter(delimiter);
    let (inferred, _) = format.infer_schema(&mut file, Some(1))?;
    file.seek(SeekFrom::Start(0))
        .map_err(|e| DashboardError::io(path, e))?;

    let schema = string_schema(&inferred);
    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(options.has_header)
        .with_delimiter(delimiter)
        .with_batch_size(options.batch_size)
        .with_truncated_rows(true)
        .build(file)?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

/// Read a Parquet file, keeping its native column types
pub fn read_parquet(path: &Path) -> Result<RecordBatch> {
    let file = safe_open_file(path, "reading parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = Arc::clone(builder.schema());
    let reader = builder.build()?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

/// Rebuild a schema with every field as nullable `Utf8` and unique names
///
/// Repeated header names get a `.1`, `.2`, … suffix in order of appearance.
fn string_schema(inferred: &Schema) -> SchemaRef {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| {
            let base = f.name().clone();
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            Field::new(name, DataType::Utf8, true)
        })
        .collect();
    Arc::new(Schema::new(fields))
}
