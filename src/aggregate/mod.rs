//! Chart datasets derived from the canonical table.
//!
//! Each dataset is computed independently from the (filtered) table. A
//! dataset whose required canonical fields are missing is reported as
//! [`ChartData::Unavailable`] so the presentation layer can show a notice in
//! place of the chart.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::schema::CanonicalField;
use crate::table::CanonicalTable;

pub mod stats;

pub use stats::{BoxSummary, HistogramBin, histogram};

/// A chart dataset, or the canonical fields that kept it from being built
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ChartData<T> {
    Available(T),
    Unavailable { missing: Vec<CanonicalField> },
}

impl<T> ChartData<T> {
    /// The dataset, if available
    #[must_use]
    pub fn available(&self) -> Option<&T> {
        match self {
            Self::Available(data) => Some(data),
            Self::Unavailable { .. } => None,
        }
    }

    /// Whether the dataset could be built
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Mean length of stay for one diagnosis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisStay {
    pub diagnosis: String,
    pub mean_los: f64,
    pub records: usize,
}

/// Raw charges recorded for one severity level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityCharges {
    pub severity: String,
    pub charges: Vec<f64>,
}

impl SeverityCharges {
    /// Quartiles, whiskers and outliers of this group
    #[must_use]
    pub fn summary(&self) -> Option<BoxSummary> {
        BoxSummary::from_values(&self.charges)
    }
}

/// Mean length of stay per facility (rows) and county (columns)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LosMatrix {
    pub facilities: Vec<String>,
    pub counties: Vec<String>,
    /// `values[facility][county]`, 0 where the pair has no records
    pub values: Vec<Vec<f64>>,
}

impl LosMatrix {
    /// Cell value for a facility/county pair
    #[must_use]
    pub fn get(&self, facility: &str, county: &str) -> Option<f64> {
        let row = self.facilities.iter().position(|f| f == facility)?;
        let col = self.counties.iter().position(|c| c == county)?;
        Some(self.values[row][col])
    }
}

/// Number of records for one payment category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentCount {
    pub payment: String,
    pub count: usize,
}

/// All length of stay values, to be binned by the consumer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LosDistribution {
    pub values: Vec<f64>,
    pub bins: usize,
}

impl LosDistribution {
    /// Equal-width bin counts using the configured bin count
    #[must_use]
    pub fn histogram(&self) -> Vec<HistogramBin> {
        histogram(&self.values, self.bins)
    }
}

/// The five chart datasets of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    pub top_diagnoses: ChartData<Vec<DiagnosisStay>>,
    pub charges_by_severity: ChartData<Vec<SeverityCharges>>,
    pub los_matrix: ChartData<LosMatrix>,
    pub payment_counts: ChartData<Vec<PaymentCount>>,
    pub los_distribution: ChartData<LosDistribution>,
}

/// Compute every chart dataset for a table
#[must_use]
pub fn compute_charts(table: &CanonicalTable, config: &DashboardConfig) -> ChartSet {
    ChartSet {
        top_diagnoses: top_diagnoses(table, config.top_n_diagnoses),
        charges_by_severity: charges_by_severity(table),
        los_matrix: los_matrix(table),
        payment_counts: payment_counts(table),
        los_distribution: los_distribution(table, config.histogram_bins),
    }
}

fn missing_fields(table: &CanonicalTable, required: &[CanonicalField]) -> Vec<CanonicalField> {
    required
        .iter()
        .copied()
        .filter(|f| !table.has_field(*f))
        .collect()
}

fn unavailable<T>(table: &CanonicalTable, required: &[CanonicalField]) -> ChartData<T> {
    ChartData::Unavailable {
        missing: missing_fields(table, required),
    }
}

/// Diagnoses with the highest mean length of stay, descending
///
/// Groups are formed in ascending diagnosis order and sorted stably, so ties
/// keep that order.
#[must_use]
pub fn top_diagnoses(table: &CanonicalTable, top_n: usize) -> ChartData<Vec<DiagnosisStay>> {
    let (Some(diagnosis), Some(los)) = (
        table.text(CanonicalField::Diagnosis.column_name()),
        table.numeric(CanonicalField::LengthOfStay),
    ) else {
        return unavailable(table, &[CanonicalField::Diagnosis, CanonicalField::LengthOfStay]);
    };

    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for (d, l) in diagnosis.iter().zip(los.iter()) {
        if let (Some(d), Some(l)) = (d, l) {
            let entry = groups.entry(d).or_insert((0.0, 0));
            entry.0 += l;
            entry.1 += 1;
        }
    }

    let mut rows: Vec<DiagnosisStay> = groups
        .into_iter()
        .map(|(d, (sum, count))| DiagnosisStay {
            diagnosis: d.to_string(),
            mean_los: sum / count as f64,
            records: count,
        })
        .collect();
    rows.sort_by(|a, b| b.mean_los.total_cmp(&a.mean_los));
    rows.truncate(top_n);

    ChartData::Available(rows)
}

/// Raw charges grouped by severity, groups in first-appearance order
///
/// Rows with missing charges are skipped.
#[must_use]
pub fn charges_by_severity(table: &CanonicalTable) -> ChartData<Vec<SeverityCharges>> {
    let (Some(severity), Some(charges)) = (
        table.text(CanonicalField::Severity.column_name()),
        table.numeric(CanonicalField::Charges),
    ) else {
        return unavailable(table, &[CanonicalField::Charges, CanonicalField::Severity]);
    };

    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut groups: Vec<SeverityCharges> = Vec::new();
    for (s, c) in severity.iter().zip(charges.iter()) {
        let (Some(s), Some(c)) = (s, c) else {
            continue;
        };
        let idx = *index.entry(s).or_insert_with(|| {
            groups.push(SeverityCharges {
                severity: s.to_string(),
                charges: Vec::new(),
            });
            groups.len() - 1
        });
        groups[idx].charges.push(c);
    }

    ChartData::Available(groups)
}

/// Mean length of stay per facility/county pair as a dense matrix
#[must_use]
pub fn los_matrix(table: &CanonicalTable) -> ChartData<LosMatrix> {
    let (Some(facility), Some(county), Some(los)) = (
        table.text(CanonicalField::Facility.column_name()),
        table.text(CanonicalField::County.column_name()),
        table.numeric(CanonicalField::LengthOfStay),
    ) else {
        return unavailable(
            table,
            &[
                CanonicalField::Facility,
                CanonicalField::County,
                CanonicalField::LengthOfStay,
            ],
        );
    };

    let mut cells: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
    let mut facilities = BTreeSet::new();
    let mut counties = BTreeSet::new();
    for ((f, c), l) in facility.iter().zip(county.iter()).zip(los.iter()) {
        let (Some(f), Some(c), Some(l)) = (f, c, l) else {
            continue;
        };
        facilities.insert(f);
        counties.insert(c);
        let cell = cells.entry((f, c)).or_insert((0.0, 0));
        cell.0 += l;
        cell.1 += 1;
    }

    let values = facilities
        .iter()
        .map(|f| {
            counties
                .iter()
                .map(|c| {
                    cells
                        .get(&(*f, *c))
                        .map_or(0.0, |(sum, count)| sum / *count as f64)
                })
                .collect()
        })
        .collect();

    ChartData::Available(LosMatrix {
        facilities: facilities.into_iter().map(str::to_string).collect(),
        counties: counties.into_iter().map(str::to_string).collect(),
        values,
    })
}

/// Records per payment category, most frequent first
///
/// Ties keep first-appearance order.
#[must_use]
pub fn payment_counts(table: &CanonicalTable) -> ChartData<Vec<PaymentCount>> {
    let Some(payment) = table.text(CanonicalField::Payment.column_name()) else {
        return unavailable(table, &[CanonicalField::Payment]);
    };

    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut counts: Vec<PaymentCount> = Vec::new();
    for p in payment.iter().flatten() {
        let idx = *index.entry(p).or_insert_with(|| {
            counts.push(PaymentCount {
                payment: p.to_string(),
                count: 0,
            });
            counts.len() - 1
        });
        counts[idx].count += 1;
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));

    ChartData::Available(counts)
}

/// Every length of stay value, in row order
#[must_use]
pub fn los_distribution(table: &CanonicalTable, bins: usize) -> ChartData<LosDistribution> {
    match table.values(CanonicalField::LengthOfStay) {
        Some(values) => ChartData::Available(LosDistribution { values, bins }),
        None => unavailable(table, &[CanonicalField::LengthOfStay]),
    }
}
