//! Mock pvdash sources for CI-safe tests and demos.
//!
//! - [`MockSource`] answers every request from deterministic fixtures.
//! - [`DynamicMockSource`] is steered by a [`DynamicMockController`]: per-day
//!   and per-month return/fail/hang rules, an artificial delay, and a log of
//!   every request for asserting fetch counts.

use async_trait::async_trait;
use chrono::NaiveDate;
use pvdash_core::connector::{BulkSource, PointSource};
use pvdash_core::{DashError, MonthBundle, MonthKey, Series};

mod dynamic;
pub mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockSource, MockBehavior};

/// First day the mock balcony inverter reports data.
pub const BALCONY_ACTIVATION: (i32, u32, u32) = (2024, 12, 16);

/// Mock source for CI-safe examples. Provides deterministic data from fixtures.
///
/// Balcony days before [`BALCONY_ACTIVATION`] yield the placeholder series,
/// like the real inverter API.
pub struct MockSource;

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    /// Create the mock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn activation() -> NaiveDate {
        let (y, m, d) = BALCONY_ACTIVATION;
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
    }
}

#[async_trait]
impl PointSource for MockSource {
    fn name(&self) -> &'static str {
        "pvdash-mock"
    }

    async fn day(&self, day: NaiveDate) -> Result<Series, DashError> {
        if day < Self::activation() {
            return Ok(Series::placeholder(day));
        }
        Ok(fixtures::balcony_day(day))
    }
}

#[async_trait]
impl BulkSource for MockSource {
    fn name(&self) -> &'static str {
        "pvdash-mock"
    }

    async fn month(&self, month: MonthKey) -> Result<MonthBundle, DashError> {
        Ok(fixtures::month_bundle(month))
    }
}
