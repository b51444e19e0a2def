use discharge_dash::{CanonicalTable, compute_metrics};

use crate::utils::{los_table, sample_table};

fn close(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|v| (v - expected).abs() < 1e-9)
}

#[test]
fn test_sample_metrics() {
    let metrics = compute_metrics(&sample_table(), 1.0);

    assert_eq!(metrics.total_records, 7);
    assert!(close(metrics.avg_los, 31.0 / 7.0));
    assert!(close(metrics.avg_charges, 23_500.5 / 6.0));
    // Only the 10 day stay is above mean + 1 std (about 7.42)
    assert!(close(metrics.pct_long_stay, 100.0 / 7.0));
}

#[test]
fn test_long_stay_share_of_known_column() {
    let metrics = compute_metrics(&los_table(&[1.0, 2.0, 3.0, 4.0, 100.0]), 1.0);
    assert!(close(metrics.avg_los, 22.0));
    assert!(close(metrics.pct_long_stay, 20.0));
}

#[test]
fn test_long_stay_share_is_a_percentage() {
    let values: Vec<f64> = (1..=50).map(f64::from).collect();
    let share = compute_metrics(&los_table(&values), 1.0).pct_long_stay.unwrap();
    assert!((0.0..=100.0).contains(&share));
}

#[test]
fn test_single_value_has_undefined_long_stay_share() {
    let metrics = compute_metrics(&los_table(&[8.0]), 1.0);
    assert!(close(metrics.avg_los, 8.0));
    assert_eq!(metrics.pct_long_stay, None);
}

#[test]
fn test_metrics_of_empty_table() {
    let metrics = compute_metrics(&CanonicalTable::empty(), 1.0);
    assert_eq!(metrics.total_records, 0);
    assert_eq!(metrics.avg_los, None);
    assert_eq!(metrics.pct_long_stay, None);
    assert_eq!(metrics.avg_charges, None);
}

#[test]
fn test_empty_length_of_stay_column() {
    let metrics = compute_metrics(&los_table(&[]), 1.0);
    assert_eq!(metrics.avg_los, None);
    assert_eq!(metrics.pct_long_stay, None);
}
