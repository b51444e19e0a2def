use discharge_dash::schema::AGE_GROUP_COLUMN;
use discharge_dash::{
    CanonicalField, Dashboard, DashboardConfig, FilterField, FilterSelection, run_pipeline,
};
use tempfile::TempDir;

use crate::utils::{coded_raw, los_table, sample_raw, write_file};

#[test]
fn test_pipeline_without_filters() {
    let snapshot =
        run_pipeline(&sample_raw(), &DashboardConfig::default(), &FilterSelection::new()).unwrap();

    assert_eq!(snapshot.metrics.total_records, 7);
    assert!(snapshot.charts.top_diagnoses.is_available());
    assert!(snapshot.charts.los_matrix.is_available());
    assert!(snapshot.selection.is_unrestricted());
}

#[test]
fn test_pipeline_applies_selection_before_aggregating() {
    let selection = FilterSelection::new().with(FilterField::Facility, ["Mercy"]);
    let snapshot = run_pipeline(&sample_raw(), &DashboardConfig::default(), &selection).unwrap();

    assert_eq!(snapshot.metrics.total_records, 3);
    assert_eq!(snapshot.metrics.avg_los, Some(3.0));
    let matrix = snapshot.charts.los_matrix.available().unwrap();
    assert_eq!(matrix.facilities, vec!["Mercy"]);
}

#[test]
fn test_pipeline_is_deterministic() {
    let config = DashboardConfig::default();
    let selection = FilterSelection::new().with(FilterField::Severity, ["Minor", "Major"]);
    let a = run_pipeline(&sample_raw(), &config, &selection).unwrap();
    let b = run_pipeline(&sample_raw(), &config, &selection).unwrap();

    assert_eq!(a.metrics, b.metrics);
    assert_eq!(a.charts, b.charts);
}

#[test]
fn test_dashboard_refresh_reuses_normalized_table() {
    let dashboard = Dashboard::from_raw(sample_raw(), DashboardConfig::default()).unwrap();
    assert_eq!(dashboard.raw().num_rows(), 8);
    assert_eq!(dashboard.table().num_rows(), 7);
    assert_eq!(
        dashboard.mapping().get(CanonicalField::County),
        Some("County")
    );

    let all = dashboard.refresh(&FilterSelection::new()).unwrap();
    let kings = dashboard
        .refresh(&FilterSelection::new().with(FilterField::County, ["Kings"]))
        .unwrap();
    assert_eq!(all.metrics.total_records, 7);
    assert_eq!(kings.metrics.total_records, 4);
    assert_eq!(dashboard.table().num_rows(), 7);
}

#[test]
fn test_dashboard_preview_limits_rows() {
    let dashboard = Dashboard::from_raw(sample_raw(), DashboardConfig::default()).unwrap();

    let preview = dashboard.preview(&FilterSelection::new(), 2).unwrap();
    assert_eq!(preview.num_rows(), 2);
    assert!(preview.column(AGE_GROUP_COLUMN).is_some());

    let selection = FilterSelection::new().with(FilterField::Facility, ["St. Luke"]);
    let preview = dashboard.preview(&selection, 100).unwrap();
    assert_eq!(preview.num_rows(), 1);
}

#[test]
fn test_dashboard_filter_options_cover_unfiltered_table() {
    let dashboard = Dashboard::from_raw(sample_raw(), DashboardConfig::default()).unwrap();
    let options = dashboard.filter_options();
    assert_eq!(options[&FilterField::County], vec!["Bronx", "Kings", "Queens"]);
    assert_eq!(options[&FilterField::Severity], vec!["Major", "Minor", "Moderate"]);
}

#[test]
fn test_dashboard_load_from_csv_with_config_file() {
    let dir = TempDir::new().unwrap();
    let data = write_file(
        dir.path(),
        "stays.csv",
        "Site,Stay_Days,Payer\nNorth,2,Medicare\nSouth,4,Private\nNorth,,Private\n",
    );
    let config_json = format!(
        r#"{{
            "data_path": {:?},
            "aliases": {{
                "facility": ["Site"],
                "length_of_stay": ["stay_days"],
                "payment": ["Payer"]
            }},
            "top_n_diagnoses": 5
        }}"#,
        data.display().to_string()
    );
    let config_path = write_file(dir.path(), "dashboard.json", &config_json);

    let config = DashboardConfig::from_json_file(&config_path).unwrap();
    assert_eq!(config.histogram_bins, 30);
    let dashboard = Dashboard::load(config).unwrap();

    // Case-insensitive alias match
    assert_eq!(
        dashboard.mapping().get(CanonicalField::LengthOfStay),
        Some("Stay_Days")
    );
    let snapshot = dashboard.refresh(&FilterSelection::new()).unwrap();
    assert_eq!(snapshot.metrics.total_records, 2);
    assert_eq!(snapshot.metrics.avg_los, Some(3.0));
    assert!(!snapshot.charts.top_diagnoses.is_available());
    assert!(snapshot.charts.payment_counts.is_available());
}

#[test]
fn test_snapshot_serializes_to_json() {
    let snapshot =
        run_pipeline(&sample_raw(), &DashboardConfig::default(), &FilterSelection::new()).unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["metrics"]["total_records"], 7);
    assert_eq!(json["charts"]["top_diagnoses"]["status"], "available");
    assert_eq!(
        json["charts"]["top_diagnoses"]["data"][0]["diagnosis"],
        "Sepsis"
    );
    assert!(json["generated_at"].is_string());
}

#[test]
fn test_unavailable_chart_serializes_missing_fields() {
    let snapshot = discharge_dash::pipeline::snapshot(
        &los_table(&[1.0, 2.0]),
        &DashboardConfig::default(),
        &FilterSelection::new(),
    )
    .unwrap();
    let json = serde_json::to_value(&snapshot.charts.payment_counts).unwrap();

    assert_eq!(json["status"], "unavailable");
    assert_eq!(json["data"]["missing"][0], "payment");
}

#[test]
fn test_numeric_cohort_column_is_filterable() {
    let selection = FilterSelection::new().with(FilterField::AgeGroup, ["1"]);
    let snapshot = run_pipeline(&coded_raw(), &DashboardConfig::default(), &selection).unwrap();

    assert_eq!(snapshot.metrics.total_records, 2);
    assert_eq!(snapshot.metrics.avg_los, Some(4.0));

    let dashboard = Dashboard::from_raw(coded_raw(), DashboardConfig::default()).unwrap();
    let options = dashboard.filter_options();
    assert_eq!(options[&FilterField::AgeGroup], vec!["1", "2"]);
    assert_eq!(options[&FilterField::Diagnosis], vec!["4.0", "Unknown"]);
}

#[test]
fn test_raw_sample_shows_loaded_columns() {
    let dashboard = Dashboard::from_raw(sample_raw(), DashboardConfig::default()).unwrap();

    let sample = dashboard.raw_sample(10);
    assert_eq!(sample.num_rows(), 8);
    assert!(sample.schema().field_with_name("Hospital").is_ok());
    assert!(sample.schema().field_with_name("LOS").is_ok());
    assert_eq!(dashboard.raw_sample(3).num_rows(), 3);
}
