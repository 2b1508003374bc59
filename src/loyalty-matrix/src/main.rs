//! Loyalty Matrix — satisfaction/loyalty segmentation and movement analytics.
//!
//! Reads a JSON array of survey data points and prints the requested analysis
//! as JSON on stdout. Logs go to stderr.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use matrix_core::config::MatrixConfig;
use matrix_core::types::{DataPoint, Midpoint, Segment};
use matrix_reporting::{
    build_report, calculate_period_comparison, calculate_quadrant_movements,
    calculate_trend_data, generate_forecast, group_by_customer, summarize_timeline,
};
use matrix_segmentation::{analyze_proximity, Classify, QuadrantClassifier};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "loyalty-matrix")]
#[command(about = "Satisfaction/loyalty segmentation and movement analytics")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON); environment variables still apply
    #[arg(long, env = "LOYALTY_MATRIX_CONFIG")]
    config: Option<PathBuf>,

    /// JSON object of manual assignments, `{"<id>": "<segment>"}`
    #[arg(long)]
    assignments: Option<PathBuf>,

    /// Midpoint satisfaction (overrides config)
    #[arg(long, requires = "midpoint_loy")]
    midpoint_sat: Option<f64>,

    /// Midpoint loyalty (overrides config)
    #[arg(long, requires = "midpoint_sat")]
    midpoint_loy: Option<f64>,

    /// Enable apostles/terrorists zones (overrides config)
    #[arg(long, default_value_t = false)]
    zones: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assign every data point to a segment
    Classify {
        /// Data point file, or `-` for stdin
        input: PathBuf,
    },

    /// Score how close each point is to neighbouring segments
    Proximity {
        input: PathBuf,

        /// Main-quadrant threshold in scale units (overrides config)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Per-customer timelines with start and end segments
    Timelines { input: PathBuf },

    /// Segment transitions between consecutive entries
    Movements { input: PathBuf },

    /// Trend series, period comparison and regression forecast
    Forecast {
        input: PathBuf,

        /// Furthest horizon in months (overrides config)
        #[arg(long)]
        months_ahead: Option<u32>,
    },

    /// Every analysis in one document
    Report { input: PathBuf },
}

#[derive(Serialize)]
struct Classified<'a> {
    id: &'a str,
    segment: Segment,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loyalty_matrix=info,matrix_segmentation=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    if let (Some(sat), Some(loy)) = (cli.midpoint_sat, cli.midpoint_loy) {
        config = config.with_midpoint(Midpoint::new(sat, loy));
    }
    if cli.zones {
        config.zones.enabled = true;
    }
    if let Some(path) = cli.assignments.as_deref() {
        let assignments = read_assignments(path)?;
        info!(count = assignments.len(), "Manual assignments loaded");
        config.manual_assignments.extend(assignments);
    }

    match cli.command {
        Commands::Classify { input } => {
            config.validate()?;
            let points = read_points(&input)?;
            let classifier = QuadrantClassifier::new(&config);
            let classified: Vec<Classified<'_>> = points
                .iter()
                .map(|p| Classified {
                    id: &p.id,
                    segment: classifier.classify(p),
                })
                .collect();
            print_json(&classified)
        }
        Commands::Proximity { input, threshold } => {
            if let Some(threshold) = threshold {
                config.proximity.main_threshold = threshold;
            }
            config.validate()?;
            let points = read_points(&input)?;
            let classifier = QuadrantClassifier::new(&config);
            print_json(&analyze_proximity(&points, &classifier, config.proximity))
        }
        Commands::Timelines { input } => {
            config.validate()?;
            let points = read_points(&input)?;
            let classifier = QuadrantClassifier::new(&config);
            let summaries: Vec<_> = group_by_customer(&points)
                .iter()
                .filter_map(|t| summarize_timeline(t, &classifier))
                .collect();
            print_json(&summaries)
        }
        Commands::Movements { input } => {
            config.validate()?;
            let points = read_points(&input)?;
            let classifier = QuadrantClassifier::new(&config);
            let timelines = group_by_customer(&points);
            print_json(&calculate_quadrant_movements(&timelines, &classifier))
        }
        Commands::Forecast {
            input,
            months_ahead,
        } => {
            if let Some(months) = months_ahead {
                config.forecast.months_ahead = months;
            }
            config.validate()?;
            let points = read_points(&input)?;
            let trend = calculate_trend_data(&group_by_customer(&points), None);
            let forecast = generate_forecast(&trend, config.forecast.months_ahead)?;
            print_json(&serde_json::json!({
                "trend": trend,
                "period_comparison": calculate_period_comparison(&trend),
                "forecast": forecast,
            }))
        }
        Commands::Report { input } => {
            let points = read_points(&input)?;
            print_json(&build_report(&points, &config)?)
        }
    }
}

/// An explicit `--config` file must load; without one, env-only failures fall
/// back to defaults.
fn load_config(path: Option<&Path>) -> anyhow::Result<MatrixConfig> {
    match path {
        Some(path) => MatrixConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(MatrixConfig::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            MatrixConfig::default()
        })),
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_points(path: &Path) -> anyhow::Result<Vec<DataPoint>> {
    let raw = read_input(path)?;
    let points: Vec<DataPoint> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of data points", path.display()))?;
    info!(points = points.len(), "Data points loaded");
    Ok(points)
}

fn read_assignments(path: &Path) -> anyhow::Result<HashMap<String, Segment>> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON object of id to segment", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
