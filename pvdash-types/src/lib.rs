//! pvdash-specific data transfer objects and configuration primitives.
#![warn(missing_docs)]

mod config;
mod error;
mod kind;
mod reports;
mod series;

pub use config::{
    BackoffConfig, BulkSourceConfig, DashConfig, PointSourceConfig, RetryConfig, StoreConfig,
};
pub use error::DashError;
pub use kind::{Granularity, Origin, SeriesKind};
pub use reports::{EnergySummary, LiveSnapshot};
pub use series::{Sample, Series};
