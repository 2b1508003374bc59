//! Cross-customer averages per calendar date, plus the first-vs-last period
//! comparison built on top of them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use matrix_core::numeric::round2;
use serde::Serialize;
use tracing::debug;

use crate::timeline::CustomerTimeline;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendDataPoint {
    pub date: NaiveDate,
    pub average_satisfaction: f64,
    pub average_loyalty: f64,
    pub count: usize,
}

#[derive(Default)]
struct Bucket {
    satisfaction: f64,
    loyalty: f64,
    count: usize,
}

/// One averaged point per distinct date across all timelines, oldest first.
/// Excluded and undated entries are skipped.
pub fn calculate_trend_data(
    timelines: &[CustomerTimeline],
    date_format_hint: Option<&str>,
) -> Vec<TrendDataPoint> {
    let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();

    for timeline in timelines {
        for (date, point) in timeline.dated_points(date_format_hint) {
            if point.excluded {
                continue;
            }
            let bucket = buckets.entry(date).or_default();
            bucket.satisfaction += point.satisfaction;
            bucket.loyalty += point.loyalty;
            bucket.count += 1;
        }
    }

    let trend: Vec<TrendDataPoint> = buckets
        .into_iter()
        .map(|(date, bucket)| {
            let n = bucket.count as f64;
            TrendDataPoint {
                date,
                average_satisfaction: round2(bucket.satisfaction / n),
                average_loyalty: round2(bucket.loyalty / n),
                count: bucket.count,
            }
        })
        .collect();

    debug!(
        timelines = timelines.len(),
        dates = trend.len(),
        "Trend data calculated"
    );
    trend
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub first: TrendDataPoint,
    pub last: TrendDataPoint,
    pub satisfaction_change: f64,
    pub loyalty_change: f64,
    pub days_between: i64,
}

/// Compare the first and last trend points. `None` with fewer than two.
pub fn calculate_period_comparison(trend: &[TrendDataPoint]) -> Option<PeriodComparison> {
    if trend.len() < 2 {
        return None;
    }
    let first = trend.first()?.clone();
    let last = trend.last()?.clone();
    Some(PeriodComparison {
        satisfaction_change: round2(last.average_satisfaction - first.average_satisfaction),
        loyalty_change: round2(last.average_loyalty - first.average_loyalty),
        days_between: (last.date - first.date).num_days(),
        first,
        last,
    })
}
