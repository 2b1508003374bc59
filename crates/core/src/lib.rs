//! Domain model for the loyalty matrix — survey data points, rating scales,
//! segments, dates, configuration and the shared error type.

pub mod config;
pub mod dates;
pub mod error;
pub mod numeric;
pub mod scale;
pub mod types;
pub mod validation;

pub use config::MatrixConfig;
pub use error::{MatrixError, MatrixResult};
pub use scale::ScaleFormat;
pub use types::{DataPoint, ManualAssignments, Midpoint, Segment};
