use discharge_dash::aggregate::{
    ChartData, charges_by_severity, los_distribution, los_matrix, payment_counts, top_diagnoses,
};
use discharge_dash::{CanonicalField, DashboardConfig, compute_charts, normalize};

use crate::utils::{dense_batch, los_table, sample_table};

#[test]
fn test_top_diagnoses_sorted_by_mean_stay() {
    let rows = top_diagnoses(&sample_table(), 15);
    let rows = rows.available().unwrap();

    let names: Vec<&str> = rows.iter().map(|r| r.diagnosis.as_str()).collect();
    assert_eq!(names, vec!["Sepsis", "Pneumonia", "Fracture", "Unknown"]);
    assert_eq!(rows[0].mean_los, 8.0);
    assert_eq!(rows[0].records, 2);
    assert!(rows.windows(2).all(|w| w[0].mean_los >= w[1].mean_los));
}

#[test]
fn test_top_diagnoses_truncates_to_n() {
    let rows = top_diagnoses(&sample_table(), 2);
    assert_eq!(rows.available().unwrap().len(), 2);
}

#[test]
fn test_top_diagnoses_ties_keep_ascending_order() {
    let raw = dense_batch(vec![
        ("Diagnosis", vec!["Zeta", "Alpha", "Mid"]),
        ("LOS", vec!["3", "3", "3"]),
    ]);
    let table = normalize(&raw, &DashboardConfig::default()).unwrap();
    let rows = top_diagnoses(&table, 15);
    let names: Vec<&str> = rows
        .available()
        .unwrap()
        .iter()
        .map(|r| r.diagnosis.as_str())
        .collect();
    assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
}

#[test]
fn test_charges_grouped_by_severity_in_first_appearance_order() {
    let groups = charges_by_severity(&sample_table());
    let groups = groups.available().unwrap();

    let names: Vec<&str> = groups.iter().map(|g| g.severity.as_str()).collect();
    assert_eq!(names, vec!["Major", "Minor", "Moderate"]);
    // The Mercy sepsis stay has no charges
    assert_eq!(groups[0].charges, vec![12_000.5]);
    assert_eq!(groups[1].charges, vec![3000.0, 1500.0, 2100.0]);
    assert_eq!(groups[1].summary().unwrap().median, 2100.0);
}

#[test]
fn test_los_matrix_is_dense_and_sorted() {
    let matrix = los_matrix(&sample_table());
    let matrix = matrix.available().unwrap();

    assert_eq!(matrix.facilities, vec!["General", "Mercy", "St. Luke"]);
    assert_eq!(matrix.counties, vec!["Bronx", "Kings", "Queens"]);
    assert_eq!(
        matrix.values,
        vec![
            vec![0.0, 6.5, 4.0],
            vec![1.0, 4.0, 0.0],
            vec![5.0, 0.0, 0.0],
        ]
    );
    assert_eq!(matrix.get("General", "Kings"), Some(6.5));
    assert_eq!(matrix.get("Nowhere", "Kings"), None);
}

#[test]
fn test_payment_counts_descending() {
    let counts = payment_counts(&sample_table());
    let counts: Vec<(&str, usize)> = counts
        .available()
        .unwrap()
        .iter()
        .map(|c| (c.payment.as_str(), c.count))
        .collect();
    assert_eq!(
        counts,
        vec![("Medicare", 3), ("Private", 2), ("Medicaid", 1), ("Unknown", 1)]
    );
}

#[test]
fn test_los_distribution_keeps_row_order() {
    let distribution = los_distribution(&sample_table(), 30);
    let distribution = distribution.available().unwrap();
    assert_eq!(distribution.values, vec![10.0, 4.0, 6.0, 2.0, 5.0, 3.0, 1.0]);

    let bins = distribution.histogram();
    assert_eq!(bins.len(), 30);
    assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 7);
}

#[test]
fn test_missing_fields_make_charts_unavailable() {
    let charts = compute_charts(&los_table(&[1.0, 2.0]), &DashboardConfig::default());

    assert_eq!(
        charts.top_diagnoses,
        ChartData::Unavailable {
            missing: vec![CanonicalField::Diagnosis]
        }
    );
    assert_eq!(
        charts.charges_by_severity,
        ChartData::Unavailable {
            missing: vec![CanonicalField::Charges, CanonicalField::Severity]
        }
    );
    assert_eq!(
        charts.los_matrix,
        ChartData::Unavailable {
            missing: vec![CanonicalField::Facility, CanonicalField::County]
        }
    );
    assert!(!charts.payment_counts.is_available());
    assert!(charts.los_distribution.is_available());
}

#[test]
fn test_charts_follow_config() {
    let config = DashboardConfig {
        top_n_diagnoses: 1,
        histogram_bins: 5,
        ..DashboardConfig::default()
    };
    let charts = compute_charts(&sample_table(), &config);
    assert_eq!(charts.top_diagnoses.available().unwrap().len(), 1);
    assert_eq!(charts.los_distribution.available().unwrap().histogram().len(), 5);
}

#[test]
fn test_charts_are_deterministic() {
    let config = DashboardConfig::default();
    let table = sample_table();
    assert_eq!(compute_charts(&table, &config), compute_charts(&table, &config));
}

#[test]
fn test_top_diagnoses_with_fewer_groups_than_n() {
    let raw = dense_batch(vec![
        ("Diagnosis", vec!["A", "B", "C", "A", "B"]),
        ("LOS", vec!["1", "5", "3", "3", "7"]),
    ]);
    let table = normalize(&raw, &DashboardConfig::default()).unwrap();
    let rows = top_diagnoses(&table, 15);
    let rows: Vec<(&str, f64)> = rows
        .available()
        .unwrap()
        .iter()
        .map(|r| (r.diagnosis.as_str(), r.mean_los))
        .collect();
    assert_eq!(rows, vec![("B", 6.0), ("C", 3.0), ("A", 2.0)]);
}

#[test]
fn test_matrix_fills_missing_pair_with_zero() {
    let raw = dense_batch(vec![
        ("Facility", vec!["North", "North", "South"]),
        ("County", vec!["Kings", "Queens", "Kings"]),
        ("LOS", vec!["2", "4", "6"]),
    ]);
    let table = normalize(&raw, &DashboardConfig::default()).unwrap();
    let matrix = los_matrix(&table);
    let matrix = matrix.available().unwrap();
    assert_eq!(matrix.get("South", "Queens"), Some(0.0));
    assert_eq!(matrix.get("North", "Queens"), Some(4.0));
}
