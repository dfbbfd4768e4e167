//! pvdash-core
//!
//! Domain types, collaborator traits and numeric helpers shared across the
//! pvdash workspace.
//!
//! - `period`: day/month addressing and upstream timestamp parsing.
//! - `bundle`: the per-day grouping a monthly bulk fetch produces.
//! - `connector`: the `PointSource` and `BulkSource` acquisition traits.
//! - `credentials`: upstream secrets and the per-session credential cache.
//! - `status`: user-visible progress messages.
//! - `timeseries`: interpolation and integration over sample series.
//!
//! Async runtime (Tokio)
//! ---------------------
//! `SessionCredentials` is built on `tokio::sync::OnceCell`; code that resolves
//! credentials through it must run under a Tokio 1.x runtime.
#![warn(missing_docs)]

/// Per-day grouping of a monthly bulk payload.
pub mod bundle;
/// Acquisition traits implemented by upstream sources.
pub mod connector;
/// Credential types, providers and the session cache.
pub mod credentials;
/// Calendar addressing helpers.
pub mod period;
/// Status line collaborators.
pub mod status;
/// Interpolation and integration helpers.
pub mod timeseries;

pub use bundle::{BulkDay, MonthBundle};
pub use connector::{BulkSource, PointSource};
pub use credentials::{CredentialProvider, Credentials, SessionCredentials, StaticCredentials};
pub use period::{MonthKey, PeriodKey, day_offset, days_between, parse_day, parse_timestamp};
pub use pvdash_types::*;
pub use status::{NoopStatus, StatusBoard, StatusId, StatusSink, TracingStatus};
pub use timeseries::integrate::integrate;
pub use timeseries::interpolate::interpolate_nearest;
