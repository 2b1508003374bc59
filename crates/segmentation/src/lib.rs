//! Segmentation engine — quadrant assignment, special-zone geometry, distance
//! to segment boundaries, proximity scoring and distribution counts.

pub mod classifier;
pub mod distance;
pub mod distribution;
pub mod proximity;
pub mod zones;

pub use classifier::{Classify, QuadrantClassifier};
pub use distance::DistanceCalculator;
pub use distribution::{filter_by_segments, segment_distribution, SegmentDistribution};
pub use proximity::{analyze_proximity, ProximityAnalyzer, ProximityResult, RiskLevel};
pub use zones::ZoneGeometry;
