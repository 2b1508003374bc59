//! Customer timelines — repeated survey entries grouped by customer identity
//! and ordered by date.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use matrix_core::dates::parse_date;
use matrix_core::numeric::round2;
use matrix_core::types::{DataPoint, Segment};
use matrix_segmentation::Classify;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierType {
    Email,
    Id,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerTimeline {
    pub identifier: String,
    pub identifier_type: IdentifierType,
    /// Ascending by date; undated or unparsable entries last.
    pub points: Vec<DataPoint>,
}

impl CustomerTimeline {
    /// Entries with a readable date, in timeline order.
    pub fn dated_points<'a>(
        &'a self,
        fallback_hint: Option<&'a str>,
    ) -> impl Iterator<Item = (NaiveDate, &'a DataPoint)> + 'a {
        self.points
            .iter()
            .filter_map(move |p| point_date(p, fallback_hint).map(|d| (d, p)))
    }

    pub fn name(&self) -> &str {
        self.points
            .iter()
            .map(|p| p.name.as_str())
            .find(|n| !n.is_empty())
            .unwrap_or("")
    }
}

/// Date of a point, read with its own format hint or the fallback.
pub fn point_date(point: &DataPoint, fallback_hint: Option<&str>) -> Option<NaiveDate> {
    let text = point.date.as_deref()?;
    parse_date(text, point.date_format.as_deref().or(fallback_hint))
}

/// Group non-excluded points into per-customer timelines. Customers with fewer
/// than two distinct dates are dropped. Output is ordered by identifier.
pub fn group_by_customer(points: &[DataPoint]) -> Vec<CustomerTimeline> {
    let mut groups: BTreeMap<(IdentifierType, String), Vec<DataPoint>> = BTreeMap::new();

    for point in points.iter().filter(|p| !p.excluded) {
        let key = match point.normalized_email() {
            Some(email) => (IdentifierType::Email, email),
            None => (IdentifierType::Id, point.id.clone()),
        };
        groups.entry(key).or_default().push(point.clone());
    }

    let total_groups = groups.len();
    let timelines: Vec<CustomerTimeline> = groups
        .into_iter()
        .filter_map(|((identifier_type, identifier), mut entries)| {
            // Stable sort keeps the input order among equal and undated entries.
            entries.sort_by_key(|p| match point_date(p, None) {
                Some(date) => (0, Some(date)),
                None => (1, None),
            });
            let distinct: BTreeSet<NaiveDate> =
                entries.iter().filter_map(|p| point_date(p, None)).collect();
            (distinct.len() >= 2).then(|| CustomerTimeline {
                identifier,
                identifier_type,
                points: entries,
            })
        })
        .collect();

    debug!(
        customers = total_groups,
        timelines = timelines.len(),
        "Customer timelines built"
    );
    timelines
}

/// Start-to-end view of one timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSummary {
    pub identifier: String,
    /// First non-empty name across the customer's entries.
    pub name: String,
    pub entries: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub first_segment: Segment,
    pub last_segment: Segment,
    pub satisfaction_change: f64,
    pub loyalty_change: f64,
}

pub fn summarize_timeline(
    timeline: &CustomerTimeline,
    classifier: &dyn Classify,
) -> Option<TimelineSummary> {
    let mut dated = timeline.dated_points(None);
    let (first_date, first) = dated.next()?;
    let (last_date, last) = dated.last()?;
    Some(TimelineSummary {
        identifier: timeline.identifier.clone(),
        name: timeline.name().to_string(),
        entries: timeline.points.len(),
        first_date,
        last_date,
        first_segment: classifier.classify(first),
        last_segment: classifier.classify(last),
        satisfaction_change: round2(last.satisfaction - first.satisfaction),
        loyalty_change: round2(last.loyalty - first.loyalty),
    })
}
