//! Configuration types shared by the store, the acquirers and the dashboard.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Exponential backoff between retries of a failed upstream request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Minimum backoff delay in milliseconds.
    pub min_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_backoff_ms: u64,
    /// Exponential factor to increase delay after each failure (>= 1).
    pub factor: u32,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_backoff_ms: 250,
            max_backoff_ms: 5_000,
            factor: 2,
            jitter_percent: 20,
        }
    }
}

impl BackoffConfig {
    /// Delay before retry number `retry` (1-based), without jitter, capped at `max_backoff_ms`.
    #[must_use]
    pub fn base_delay_ms(&self, retry: u32) -> u64 {
        let factor = u64::from(self.factor.max(1));
        let mut delay = self.min_backoff_ms;
        for _ in 1..retry {
            delay = delay.saturating_mul(factor);
            if delay >= self.max_backoff_ms {
                break;
            }
        }
        delay.min(self.max_backoff_ms)
    }
}

/// Retry budget for upstream requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per request, including the first one. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Optional delay between attempts; `None` retries immediately.
    pub backoff: Option<BackoffConfig>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: None,
        }
    }
}

/// Behavior of the series cache.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Upper bound for a single `get`, including time spent waiting on another
    /// caller's population. `None` waits as long as population takes.
    pub get_timeout: Option<Duration>,
    /// How long a failed key keeps returning its recorded error before the next
    /// `get` retries population. Zero releases the key immediately.
    pub failure_cooldown: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            get_timeout: Some(Duration::from_secs(60)),
            failure_cooldown: Duration::ZERO,
        }
    }
}

/// Inverter cloud API (balcony production, one request per day).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointSourceConfig {
    /// Base URL of the station report API; the report path is appended.
    pub base_url: String,
    /// Station identifier sent with every request.
    pub station_id: u64,
    /// First day the station reported data. Earlier days yield a placeholder series.
    pub activation_date: NaiveDate,
    /// Rows requested per page. Only the first page is fetched.
    pub page_size: u32,
}

impl Default for PointSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://neapi.hoymiles.com/pvm-report/api/0/station".to_string(),
            station_id: 7_446_940,
            activation_date: NaiveDate::from_ymd_opt(2024, 12, 16).unwrap_or_default(),
            page_size: 100,
        }
    }
}

/// Home-automation statistics export (roof, consumption, grid; one request per month).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSourceConfig {
    /// DNS alias that redirects to the current address of the miniserver.
    pub dns_alias_url: String,
    /// Statistics resource id; the export file is `<resource_id>.<YYYYMM>.xml`.
    pub resource_id: String,
}

impl Default for BulkSourceConfig {
    fn default() -> Self {
        Self {
            dns_alias_url: "https://dns.loxonecloud.com/504F94A0FD08".to_string(),
            resource_id: "18cefec1-017c-47f3-ffffed57184a04d2".to_string(),
        }
    }
}

/// Top-level configuration bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashConfig {
    /// Cache behavior.
    pub store: StoreConfig,
    /// Retry budget for both sources.
    pub retry: RetryConfig,
    /// Point (daily) source.
    pub point: PointSourceConfig,
    /// Bulk (monthly) source.
    pub bulk: BulkSourceConfig,
}
