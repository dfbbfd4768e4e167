//! pvdash caches and derives household energy series for a PV dashboard.
//!
//! Overview
//! - Two upstream sources feed the cache: a point source that answers one day
//!   per request (balcony production) and a bulk source that answers a whole
//!   month per request (roof production, consumption, grid exchange).
//! - [`SeriesStore`] is single-flight per `(kind, day)`: concurrent requests for
//!   the same key trigger exactly one fetch, every caller gets the same result.
//! - Derived kinds (feed-in, grid draw, net consumption) are computed from
//!   other kinds fetched through the same store, so shared dependencies are
//!   fetched once.
//! - [`Dashboard`] adds the read paths a UI needs: day ranges, live readings and
//!   integrated energy.
//!
//! Key behaviors and trade-offs
//! - Ready values never change for the lifetime of the store.
//! - Failures are handed to every waiter and release the key; an optional
//!   cooldown answers with the failure for a while before retrying upstream.
//! - A bulk fetch publishes every day of its month, so later requests for
//!   sibling days and kinds are cache hits.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use pvdash::{Dashboard, SeriesKind};
//!
//! let dash = Dashboard::builder()
//!     .point_source(Arc::new(point))
//!     .bulk_source(Arc::new(bulk))
//!     .build()?;
//!
//! let today = chrono::Local::now().date_naive();
//! let net = dash.series(SeriesKind::NetConsumption, today).await?;
//! let summary = dash.summary(today).await?;
//! ```
//!
//! See `demos/examples/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub(crate) mod core;
mod derive;
mod store;

pub use core::{Dashboard, DashboardBuilder};
pub use derive::{feed_in, grid_draw, net_consumption};
pub use store::{SeriesKey, SeriesStore, SlotState};

// Re-export core types for convenience
pub use pvdash_core::{
    BulkSource, CredentialProvider, Credentials, DashConfig, DashError, EnergySummary,
    Granularity, LiveSnapshot, MonthBundle, MonthKey, NoopStatus, Origin, PeriodKey, PointSource,
    Sample, Series, SeriesKind, SessionCredentials, StaticCredentials, StatusBoard, StatusSink,
    StoreConfig, TracingStatus, day_offset, integrate, interpolate_nearest,
};
