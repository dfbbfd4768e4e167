//! pvdash-http
//!
//! reqwest-backed upstream sources for pvdash:
//!
//! - [`PointAcquirer`]: daily balcony production from the inverter cloud
//!   report API (JSON, bearer token).
//! - [`BulkAcquirer`]: monthly roof, consumption and grid statistics from the
//!   home-automation server's XML export (DNS alias redirect, HTTP Basic).
//! - [`TokenLogin`]: credential provider that logs in for the bearer token.
//!
//! Every request goes through a [`RetryingFetcher`], which spends a fixed
//! attempt budget and reports exhausted requests on the status sink.
//! [`HttpSources::builder`] wires all of it around one client and one
//! credential session.
#![warn(missing_docs)]

mod builder;
/// Bulk statistics acquisition and XML decoding.
pub mod bulk;
/// Retrying request execution.
pub mod fetcher;
/// Inverter cloud login.
pub mod login;
/// Point production acquisition and JSON decoding.
pub mod point;

pub use builder::{HttpSources, HttpSourcesBuilder};
pub use bulk::{BulkAcquirer, parse_stats_xml};
pub use fetcher::{RetryingFetcher, jitter_wait};
pub use login::{DEFAULT_LOGIN_URL, TokenLogin};
pub use point::{PointAcquirer, parse_power_report};
