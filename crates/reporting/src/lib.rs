//! Historical analysis and reporting — customer timelines, trend averages,
//! quadrant movements, forecasts and the combined dashboard report.

pub mod forecast;
pub mod movement;
pub mod report;
pub mod timeline;
pub mod trend;

pub use forecast::{generate_forecast, Confidence, ForecastError, ForecastResult};
pub use movement::{calculate_quadrant_movements, MovementDirection, MovementStats};
pub use report::{build_report, DashboardReport};
pub use timeline::{group_by_customer, summarize_timeline, CustomerTimeline, IdentifierType};
pub use trend::{
    calculate_period_comparison, calculate_trend_data, PeriodComparison, TrendDataPoint,
};
