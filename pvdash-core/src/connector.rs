use async_trait::async_trait;
use chrono::NaiveDate;

use crate::DashError;
use crate::bundle::MonthBundle;
use crate::period::MonthKey;
use pvdash_types::Series;

/// Source that serves one day per request (the inverter cloud API).
#[async_trait]
pub trait PointSource: Send + Sync {
    /// Stable identifier used in logs and errors.
    fn name(&self) -> &'static str;

    /// Fetch the production samples of `day`.
    ///
    /// Implementations return a non-empty series: days without upstream data
    /// yield [`Series::placeholder`].
    async fn day(&self, day: NaiveDate) -> Result<Series, DashError>;
}

/// Source that serves a whole month per request (the statistics export).
#[async_trait]
pub trait BulkSource: Send + Sync {
    /// Stable identifier used in logs and errors.
    fn name(&self) -> &'static str;

    /// Fetch every row of `month`, grouped per day.
    async fn month(&self, month: MonthKey) -> Result<MonthBundle, DashError>;
}
