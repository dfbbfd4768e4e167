#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use httpmock::MockServer;
use pvdash_core::{
    BulkSourceConfig, Credentials, PointSourceConfig, RetryConfig, StaticCredentials, StatusBoard,
};
use pvdash_http::{HttpSources, RetryingFetcher};

pub const TOKEN: &str = "tok-123";
/// `user:pass` in Basic form.
pub const BASIC: &str = "Basic dXNlcjpwYXNz";
pub const RESOURCE: &str = "res-1";
pub const STATION: u64 = 42;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn credentials() -> Arc<StaticCredentials> {
    Arc::new(StaticCredentials::new(Credentials::new(TOKEN, "user", "pass")))
}

pub fn fetcher(status: Arc<StatusBoard>) -> Arc<RetryingFetcher> {
    Arc::new(RetryingFetcher::new(
        reqwest::Client::new(),
        RetryConfig::default(),
        status,
    ))
}

pub struct Rig {
    pub sources: HttpSources,
    pub status: Arc<StatusBoard>,
}

pub fn rig(server: &MockServer) -> Rig {
    let status = Arc::new(StatusBoard::new());
    let sources = HttpSources::builder()
        .status(status.clone())
        .credentials(credentials())
        .point_config(PointSourceConfig {
            base_url: server.url("/station"),
            station_id: STATION,
            activation_date: day(2024, 12, 16),
            page_size: 100,
        })
        .bulk_config(BulkSourceConfig {
            dns_alias_url: server.url("/alias"),
            resource_id: RESOURCE.to_string(),
        })
        .build()
        .unwrap();
    Rig { sources, status }
}
