//! Satisfaction and loyalty forecasting. Each metric gets its own least-squares
//! fit over the trend series, projected past the last observation.

use chrono::{Months, NaiveDate};
use matrix_core::numeric::round2;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::trend::TrendDataPoint;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Every observation shares one x value, so the slope is undefined.
    #[error("Degenerate regression: zero variance across {points} x values")]
    DegenerateRegression { points: usize },

    #[error("Regression inputs differ in length: {xs} x values, {ys} y values")]
    LengthMismatch { xs: usize, ys: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination clamped to `[0, 1]`.
    pub r_squared: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least squares over paired samples.
pub fn linear_regression(xs: &[f64], ys: &[f64]) -> Result<LinearFit, ForecastError> {
    if xs.len() != ys.len() {
        return Err(ForecastError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    let n = xs.len() as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
    let sum_x2: f64 = xs.iter().map(|x| x * x).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if xs.is_empty() || denominator.abs() < f64::EPSILON {
        return Err(ForecastError::DegenerateRegression { points: xs.len() });
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;

    let mean_y = sum_y / n;
    let ss_tot: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
        .sum();
    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn from_fit(r_squared: f64, point_count: usize) -> Self {
        if point_count < 3 {
            Confidence::Low
        } else if r_squared >= 0.7 && point_count >= 5 {
            Confidence::High
        } else if r_squared >= 0.4 && point_count >= 4 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricForecast {
    pub fit: LinearFit,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub months_ahead: u32,
    pub forecasted_satisfaction: f64,
    pub forecasted_loyalty: f64,
    /// The lower of the two metric confidences.
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub satisfaction: MetricForecast,
    pub loyalty: MetricForecast,
    pub points: Vec<ForecastPoint>,
    pub based_on_points: usize,
    pub last_observed: NaiveDate,
}

/// Forecast horizons in months: 1, 3 and `months_ahead`, ascending, unique.
pub fn forecast_horizons(months_ahead: u32) -> Vec<u32> {
    let mut horizons = vec![1, 3, months_ahead];
    horizons.retain(|m| *m > 0);
    horizons.sort_unstable();
    horizons.dedup();
    horizons
}

/// Project the trend series forward. `Ok(None)` with fewer than two trend
/// points; an error when all points share one date.
pub fn generate_forecast(
    trend: &[TrendDataPoint],
    months_ahead: u32,
) -> Result<Option<ForecastResult>, ForecastError> {
    if trend.len() < 2 {
        return Ok(None);
    }
    let (Some(first), Some(last)) = (trend.first(), trend.last()) else {
        return Ok(None);
    };
    let origin = first.date;

    let xs: Vec<f64> = trend
        .iter()
        .map(|t| (t.date - origin).num_days() as f64)
        .collect();
    let sat: Vec<f64> = trend.iter().map(|t| t.average_satisfaction).collect();
    let loy: Vec<f64> = trend.iter().map(|t| t.average_loyalty).collect();

    let sat_fit = linear_regression(&xs, &sat).map_err(|e| {
        warn!(error = %e, "Satisfaction regression is degenerate");
        e
    })?;
    let loy_fit = linear_regression(&xs, &loy).map_err(|e| {
        warn!(error = %e, "Loyalty regression is degenerate");
        e
    })?;

    let n = trend.len();
    let satisfaction = MetricForecast {
        fit: sat_fit,
        confidence: Confidence::from_fit(sat_fit.r_squared, n),
    };
    let loyalty = MetricForecast {
        fit: loy_fit,
        confidence: Confidence::from_fit(loy_fit.r_squared, n),
    };
    let combined = satisfaction.confidence.min(loyalty.confidence);

    let points: Vec<ForecastPoint> = forecast_horizons(months_ahead)
        .into_iter()
        .filter_map(|months| {
            let date = last.date.checked_add_months(Months::new(months))?;
            let x = (date - origin).num_days() as f64;
            Some(ForecastPoint {
                date,
                months_ahead: months,
                forecasted_satisfaction: round2(sat_fit.predict(x)),
                forecasted_loyalty: round2(loy_fit.predict(x)),
                confidence: combined,
            })
        })
        .collect();

    debug!(
        trend_points = n,
        sat_slope = sat_fit.slope,
        loy_slope = loy_fit.slope,
        sat_r2 = sat_fit.r_squared,
        loy_r2 = loy_fit.r_squared,
        confidence = ?combined,
        "Forecast generated"
    );

    Ok(Some(ForecastResult {
        satisfaction,
        loyalty,
        points,
        based_on_points: n,
        last_observed: last.date,
    }))
}
