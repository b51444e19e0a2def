use std::path::PathBuf;

use anyhow::Context;
use arrow::util::pretty::pretty_format_batches;
use clap::Parser;
use discharge_dash::aggregate::{ChartData, ChartSet};
use discharge_dash::filter::FilterOptions;
use discharge_dash::{
    CanonicalField, ColumnMapping, Dashboard, DashboardConfig, DashboardSnapshot, FilterField,
    FilterSelection,
};
use itertools::Itertools;

/// Rows of the loaded table shown next to the column mapping
const RAW_SAMPLE_ROWS: usize = 10;

#[derive(Parser, Debug)]
#[command(
    name = "discharge-dash",
    about = "Summarize an inpatient discharge table into dashboard KPIs and charts."
)]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV or Parquet file, overriding the configured path
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Keep only these facilities
    #[arg(long)]
    facility: Vec<String>,

    /// Keep only these counties
    #[arg(long)]
    county: Vec<String>,

    /// Keep only these diagnoses
    #[arg(long)]
    diagnosis: Vec<String>,

    /// Keep only these severity levels
    #[arg(long)]
    severity: Vec<String>,

    /// Keep only these age cohorts (0-17, 18-35, 36-50, 51-65, 65+)
    #[arg(long)]
    age_group: Vec<String>,

    /// Number of diagnoses in the top diagnoses chart
    #[arg(long)]
    top_n: Option<usize>,

    /// Print the snapshot as JSON instead of a text report
    #[arg(long)]
    json: bool,

    /// Print the first N filtered records (the configured preview size if N is omitted)
    #[arg(long, value_name = "N", num_args = 0..=1)]
    preview: Option<Option<usize>>,

    /// Print how source columns were mapped to canonical fields, with a raw sample
    #[arg(long)]
    show_mapping: bool,

    /// Print the values available for each filter
    #[arg(long)]
    list_options: bool,
}

impl Args {
    fn selection(&self) -> FilterSelection {
        FilterSelection::new()
            .with(FilterField::Facility, self.facility.iter().cloned())
            .with(FilterField::County, self.county.iter().cloned())
            .with(FilterField::Diagnosis, self.diagnosis.iter().cloned())
            .with(FilterField::Severity, self.severity.iter().cloned())
            .with(FilterField::AgeGroup, self.age_group.iter().cloned())
    }

    fn dashboard_config(&self) -> anyhow::Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::from_json_file(path)
                .with_context(|| format!("Failed to read configuration {}", path.display()))?,
            None => DashboardConfig::default(),
        };
        if let Some(data) = &self.data {
            config = config.with_data_path(data);
        }
        if let Some(top_n) = self.top_n {
            config.top_n_diagnoses = top_n;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.dashboard_config()?;
    let data_path = config.data_path.clone();
    let dashboard = Dashboard::load(config)
        .with_context(|| format!("Failed to load discharge data from {}", data_path.display()))?;

    if args.show_mapping {
        print_mapping(dashboard.mapping());
        println!("Raw sample");
        println!(
            "{}\n",
            pretty_format_batches(&[dashboard.raw_sample(RAW_SAMPLE_ROWS)])?
        );
    }
    if args.list_options {
        print_options(&dashboard.filter_options());
    }

    let selection = args.selection();
    let snapshot = dashboard.refresh(&selection)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_report(&snapshot);
    }

    if let Some(rows) = args.preview {
        let rows = rows.unwrap_or(dashboard.config().preview_rows);
        let preview = dashboard.preview(&selection, rows)?;
        println!("{}", pretty_format_batches(&[preview.into_batch()])?);
    }

    Ok(())
}

fn print_mapping(mapping: &ColumnMapping) {
    println!("Column mapping");
    for (field, source) in mapping.entries() {
        println!("  {field:<16} <- {}", source.unwrap_or("(not found)"));
    }
    println!();
}

fn print_options(options: &FilterOptions) {
    println!("Filter options");
    for (field, values) in options {
        println!("  {field} ({}): {}", values.len(), values.join(", "));
    }
    println!();
}

fn fmt_opt(value: Option<f64>, suffix: &str) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}{suffix}"))
}

fn print_unavailable(missing: &[CanonicalField]) {
    println!("  (unavailable: missing {})", missing.iter().join(", "));
}

fn print_report(snapshot: &DashboardSnapshot) {
    let metrics = &snapshot.metrics;
    println!("Generated at: {}", snapshot.generated_at);
    println!("Records: {}", metrics.total_records);
    println!("Average length of stay: {}", fmt_opt(metrics.avg_los, " days"));
    println!("Long stays: {}", fmt_opt(metrics.pct_long_stay, "%"));
    println!("Average charges: {}", fmt_opt(metrics.avg_charges, ""));
    println!();
    print_charts(&snapshot.charts);
}

fn print_charts(charts: &ChartSet) {
    println!("Top diagnoses by mean length of stay");
    match &charts.top_diagnoses {
        ChartData::Available(rows) => {
            for row in rows {
                println!(
                    "  {:<40} {:>8.2} ({} records)",
                    row.diagnosis, row.mean_los, row.records
                );
            }
        }
        ChartData::Unavailable { missing } => print_unavailable(missing),
    }

    println!("\nCharges by severity");
    match &charts.charges_by_severity {
        ChartData::Available(groups) => {
            for group in groups {
                match group.summary() {
                    Some(s) => println!(
                        "  {:<20} n={:<6} q1={:.2} median={:.2} q3={:.2} outliers={}",
                        group.severity,
                        group.charges.len(),
                        s.q1,
                        s.median,
                        s.q3,
                        s.outliers.len()
                    ),
                    None => println!("  {:<20} n=0", group.severity),
                }
            }
        }
        ChartData::Unavailable { missing } => print_unavailable(missing),
    }

    println!("\nMean length of stay by facility and county");
    match &charts.los_matrix {
        ChartData::Available(matrix) => {
            println!("  {:<30} {}", "", matrix.counties.join(" | "));
            for (facility, row) in matrix.facilities.iter().zip(&matrix.values) {
                let cells = row.iter().map(|v| format!("{v:.1}")).join(" | ");
                println!("  {facility:<30} {cells}");
            }
        }
        ChartData::Unavailable { missing } => print_unavailable(missing),
    }

    println!("\nPayment types");
    match &charts.payment_counts {
        ChartData::Available(counts) => {
            for count in counts {
                println!("  {:<30} {}", count.payment, count.count);
            }
        }
        ChartData::Unavailable { missing } => print_unavailable(missing),
    }

    println!("\nLength of stay distribution");
    match &charts.los_distribution {
        ChartData::Available(distribution) => {
            for bin in distribution.histogram() {
                println!(
                    "  [{:>8.2}, {:>8.2}) {}",
                    bin.lower,
                    bin.upper,
                    "#".repeat(bin.count.min(60))
                );
            }
        }
        ChartData::Unavailable { missing } => print_unavailable(missing),
    }
}
