//! Numeric helpers over sample series.
//!
//! Modules include:
//! - `interpolate`: value of a series at an arbitrary instant, with a grace window at the edges
//! - `integrate`: trapezoidal energy of a power series, skipping data gaps
/// Trapezoidal integration with gap rejection.
pub mod integrate;
/// Nearest-value interpolation with boundary grace.
pub mod interpolate;
