//! Data-quality checks surfaced to the host. Nothing here mutates or clamps
//! the data; offending points are reported for correction.

use std::collections::HashSet;

use serde::Serialize;

use crate::config::ScaleConfig;
use crate::types::DataPoint;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    MissingId { index: usize },
    DuplicateId { id: String },
    OutOfScale {
        id: String,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Out-of-scale values of one point, satisfaction first.
fn scale_issues<'a>(
    point: &'a DataPoint,
    scales: &ScaleConfig,
) -> impl Iterator<Item = ValidationIssue> + 'a {
    let checks = [
        ("satisfaction", point.satisfaction, scales.satisfaction),
        ("loyalty", point.loyalty, scales.loyalty),
    ];
    checks
        .into_iter()
        .filter(|(_, value, scale)| !scale.contains(*value))
        .map(move |(field, value, scale)| ValidationIssue::OutOfScale {
            id: point.id.clone(),
            field,
            value,
            min: scale.min(),
            max: scale.max(),
        })
}

/// Collect every data-quality issue in a collection, in input order.
pub fn validate_points(points: &[DataPoint], scales: &ScaleConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (index, point) in points.iter().enumerate() {
        if point.id.trim().is_empty() {
            issues.push(ValidationIssue::MissingId { index });
        } else if !seen.insert(point.id.as_str()) {
            issues.push(ValidationIssue::DuplicateId {
                id: point.id.clone(),
            });
        }

        issues.extend(scale_issues(point, scales));
    }

    if !issues.is_empty() {
        tracing::warn!(issues = issues.len(), "Data points failed validation");
    }
    issues
}
