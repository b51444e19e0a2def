//! Headline KPIs for the currently filtered table.

use serde::Serialize;

use crate::aggregate::stats::{mean, sample_std};
use crate::schema::CanonicalField;
use crate::table::CanonicalTable;

/// Scalar KPIs, recomputed on every refresh
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    /// Mean length of stay
    pub avg_los: Option<f64>,
    /// Percentage of rows whose length of stay exceeds `mean + k·std`
    pub pct_long_stay: Option<f64>,
    /// Mean of the non-missing charges
    pub avg_charges: Option<f64>,
    /// Rows in the filtered table
    pub total_records: usize,
}

/// Compute the KPIs of a canonical table
///
/// `std_multiplier` is the `k` of the long stay threshold. Any KPI whose
/// field is absent, or that has no values to work from, is `None`.
#[must_use]
pub fn compute_metrics(table: &CanonicalTable, std_multiplier: f64) -> Metrics {
    let los = table.values(CanonicalField::LengthOfStay);
    let charges = table.values(CanonicalField::Charges);

    let avg_los = los.as_deref().and_then(mean);
    let pct_long_stay = los
        .as_deref()
        .and_then(|values| long_stay_share(values, table.num_rows(), std_multiplier));
    let avg_charges = charges.as_deref().and_then(mean);

    Metrics {
        avg_los,
        pct_long_stay,
        avg_charges,
        total_records: table.num_rows(),
    }
}

fn long_stay_share(values: &[f64], rows: usize, std_multiplier: f64) -> Option<f64> {
    if rows == 0 {
        return None;
    }
    let threshold = mean(values)? + std_multiplier * sample_std(values)?;
    let long = values.iter().filter(|v| **v > threshold).count();
    Some(100.0 * long as f64 / rows as f64)
}
