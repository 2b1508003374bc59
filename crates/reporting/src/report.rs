//! Matrix dashboard report — every analysis over one dataset, sharing a single
//! classifier so counts, proximity and movements agree on segment membership.

use matrix_core::config::MatrixConfig;
use matrix_core::error::MatrixResult;
use matrix_core::types::{Midpoint, Segment};
use matrix_core::validation::{validate_points, ValidationIssue};
use matrix_core::DataPoint;
use matrix_segmentation::{
    analyze_proximity, segment_distribution, ProximityResult, QuadrantClassifier,
    SegmentDistribution,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::forecast::{generate_forecast, ForecastResult};
use crate::movement::{calculate_quadrant_movements, MovementStats};
use crate::timeline::{group_by_customer, summarize_timeline, TimelineSummary};
use crate::trend::{
    calculate_period_comparison, calculate_trend_data, PeriodComparison, TrendDataPoint,
};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub midpoint: Midpoint,
    pub validation_issues: Vec<ValidationIssue>,
    pub distribution: SegmentDistribution,
    pub proximity: ProximityResult,
    pub timeline_count: usize,
    pub timelines: Vec<TimelineSummary>,
    pub trend: Vec<TrendDataPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_comparison: Option<PeriodComparison>,
    pub movements: MovementStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Absent with fewer than two trend dates.
    pub forecast: Option<ForecastResult>,
}

impl DashboardReport {
    pub fn segment_count(&self, segment: Segment) -> usize {
        self.distribution.count(segment)
    }

    pub fn has_issues(&self) -> bool {
        !self.validation_issues.is_empty()
    }
}

/// Run every analysis over `points`. Fails only on an invalid configuration;
/// data problems are reported in `validation_issues`.
pub fn build_report(points: &[DataPoint], config: &MatrixConfig) -> MatrixResult<DashboardReport> {
    config.validate()?;
    let classifier = QuadrantClassifier::new(config);

    let validation_issues = validate_points(points, &config.scale);
    let distribution = segment_distribution(points, &classifier);
    let proximity = analyze_proximity(points, &classifier, config.proximity);

    let timelines = group_by_customer(points);
    let summaries: Vec<TimelineSummary> = timelines
        .iter()
        .filter_map(|t| summarize_timeline(t, &classifier))
        .collect();
    let trend = calculate_trend_data(&timelines, None);
    let period_comparison = calculate_period_comparison(&trend);
    let movements = calculate_quadrant_movements(&timelines, &classifier);

    // Trend dates are distinct, so the regression cannot be degenerate here.
    let forecast = generate_forecast(&trend, config.forecast.months_ahead).unwrap_or_else(|e| {
        warn!(error = %e, "Forecast skipped");
        None
    });

    info!(
        points = points.len(),
        issues = validation_issues.len(),
        timelines = timelines.len(),
        relationships = proximity.summary.total_relationships,
        movements = movements.total_movements,
        forecast = forecast.is_some(),
        "Matrix report built"
    );

    Ok(DashboardReport {
        midpoint: classifier.midpoint(),
        validation_issues,
        distribution,
        proximity,
        timeline_count: timelines.len(),
        timelines: summaries,
        trend,
        period_comparison,
        movements,
        forecast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix_core::config::MatrixConfig;

    fn survey() -> Vec<DataPoint> {
        vec![
            DataPoint::new("1", 2.0, 2.0).with_email("a@x.com").with_date("2024-01-01"),
            DataPoint::new("2", 3.5, 3.5).with_email("a@x.com").with_date("2024-02-01"),
            DataPoint::new("3", 4.0, 4.5).with_email("a@x.com").with_date("2024-03-01"),
            DataPoint::new("4", 4.5, 2.0).with_email("b@x.com").with_date("2024-01-01"),
            DataPoint::new("5", 4.0, 1.5).with_email("b@x.com").with_date("2024-03-01"),
            DataPoint::new("6", 1.0, 5.0),
        ]
    }

    #[test]
    fn test_report_composes_every_analysis() {
        let report = build_report(&survey(), &MatrixConfig::default()).unwrap();
        assert!(!report.has_issues());
        assert_eq!(report.distribution.total, 6);
        assert_eq!(report.segment_count(Segment::Loyalists), 2);
        assert_eq!(report.segment_count(Segment::Mercenaries), 2);
        assert_eq!(report.segment_count(Segment::Hostages), 1);
        assert_eq!(report.segment_count(Segment::Defectors), 1);

        assert_eq!(report.timeline_count, 2);
        assert_eq!(report.timelines.len(), 2);
        assert_eq!(report.trend.len(), 3);
        assert!(report.period_comparison.is_some());
        assert_eq!(report.movements.total_movements, 3);
        assert_eq!(report.movements.positive_movements, 1);
        assert_eq!(report.movements.neutral_movements, 2);
        assert!(report.forecast.is_some());
    }

    #[test]
    fn test_report_surfaces_data_issues() {
        let mut points = survey();
        points.push(DataPoint::new("1", 9.0, 3.0));
        let report = build_report(&points, &MatrixConfig::default()).unwrap();
        assert_eq!(report.validation_issues.len(), 2);
    }

    #[test]
    fn test_report_rejects_invalid_config() {
        let config = MatrixConfig::default().with_midpoint(Midpoint::new(9.0, 3.0));
        assert!(build_report(&survey(), &config).is_err());
    }

    #[test]
    fn test_report_serializes() {
        let report = build_report(&survey(), &MatrixConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["midpoint"]["sat"], 3.0);
        assert!(json["proximity"]["analysis"].is_object());
        assert!(json["forecast"]["points"].is_array());
    }

    #[test]
    fn test_undated_points_have_no_forecast() {
        let points = vec![DataPoint::new("1", 4.0, 4.0), DataPoint::new("2", 2.0, 2.0)];
        let report = build_report(&points, &MatrixConfig::default()).unwrap();
        assert!(report.trend.is_empty());
        assert!(report.forecast.is_none());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("forecast").is_none());
    }
}
