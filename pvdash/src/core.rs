use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::try_join_all;
use pvdash_core::{
    BulkSource, DashError, EnergySummary, LiveSnapshot, NoopStatus, PointSource, Sample, Series,
    SeriesKind, StatusSink, StoreConfig, days_between, integrate,
};

use crate::store::SeriesStore;

/// Read side of the dashboard: cached series, live readings and energy totals.
///
/// Cloning is cheap; clones share one [`SeriesStore`].
#[derive(Clone)]
pub struct Dashboard {
    store: Arc<SeriesStore>,
}

/// Builder for constructing a [`Dashboard`].
pub struct DashboardBuilder {
    point: Option<Arc<dyn PointSource>>,
    bulk: Option<Arc<dyn BulkSource>>,
    status: Arc<dyn StatusSink>,
    cfg: StoreConfig,
}

impl Default for DashboardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardBuilder {
    /// Create a new builder with default store configuration.
    ///
    /// Behavior and trade-offs:
    /// - Both sources must be registered before [`build`](Self::build).
    /// - Status messages are discarded unless a sink is set via [`status`](Self::status).
    /// - Defaults: 60s `get` timeout, no failure cooldown.
    #[must_use]
    pub fn new() -> Self {
        Self {
            point: None,
            bulk: None,
            status: Arc::new(NoopStatus),
            cfg: StoreConfig::default(),
        }
    }

    /// Source for daily (balcony) data.
    #[must_use]
    pub fn point_source(mut self, source: Arc<dyn PointSource>) -> Self {
        self.point = Some(source);
        self
    }

    /// Source for monthly (roof, consumption, grid) data.
    #[must_use]
    pub fn bulk_source(mut self, source: Arc<dyn BulkSource>) -> Self {
        self.bulk = Some(source);
        self
    }

    /// Sink for progress and error messages.
    #[must_use]
    pub fn status(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.status = sink;
        self
    }

    /// Replace the whole store configuration.
    #[must_use]
    pub const fn store_config(mut self, cfg: StoreConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Bound every `get`, including time spent waiting on another caller.
    ///
    /// Behavior and trade-offs:
    /// - `None` waits as long as population takes; a hung upstream then hangs
    ///   every caller of that key.
    /// - When the populating caller times out, callers waiting on it receive
    ///   `Abandoned` and the key is released for the next request.
    #[must_use]
    pub const fn get_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.cfg.get_timeout = timeout;
        self
    }

    /// Keep answering with a failure for `cooldown` before retrying upstream.
    ///
    /// Behavior and trade-offs:
    /// - Zero (the default) retries on the very next request.
    /// - A short cooldown shields a failing upstream from a burst of retries
    ///   when many views request the same day at once.
    #[must_use]
    pub const fn failure_cooldown(mut self, cooldown: Duration) -> Self {
        self.cfg.failure_cooldown = cooldown;
        self
    }

    /// Build the dashboard.
    ///
    /// # Errors
    /// Returns `InvalidArg` if either source is missing.
    pub fn build(self) -> Result<Dashboard, DashError> {
        let point = self
            .point
            .ok_or_else(|| DashError::InvalidArg("no point source configured".into()))?;
        let bulk = self
            .bulk
            .ok_or_else(|| DashError::InvalidArg("no bulk source configured".into()))?;
        Ok(Dashboard {
            store: Arc::new(SeriesStore::new(point, bulk, self.status, self.cfg)),
        })
    }
}

impl Dashboard {
    /// Start building a new `Dashboard`.
    #[must_use]
    pub fn builder() -> DashboardBuilder {
        DashboardBuilder::new()
    }

    /// Underlying cache.
    #[must_use]
    pub fn store(&self) -> &Arc<SeriesStore> {
        &self.store
    }

    /// One day of `kind`.
    ///
    /// # Errors
    /// See [`SeriesStore::get`].
    pub async fn series(&self, kind: SeriesKind, day: NaiveDate) -> Result<Arc<Series>, DashError> {
        self.store.get(kind, day).await
    }

    /// `kind` over `from..=to`, concatenated in day order.
    ///
    /// Days are resolved concurrently; bulk kinds of one month share a fetch.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `to < from`, otherwise the first failing day's error.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pvdash::dashboard::range", skip(self), fields(kind = %kind))
    )]
    pub async fn range(
        &self,
        kind: SeriesKind,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Series, DashError> {
        let days = checked_days(from, to)?;
        let parts = try_join_all(days.into_iter().map(|d| self.store.get(kind, d))).await?;
        Ok(Series::new(
            parts
                .iter()
                .flat_map(|s| s.samples().iter().copied())
                .collect(),
        ))
    }

    /// Most recent sample of `kind` on `day`.
    ///
    /// # Errors
    /// See [`SeriesStore::get`].
    pub async fn latest(&self, kind: SeriesKind, day: NaiveDate) -> Result<Option<Sample>, DashError> {
        Ok(self.store.get(kind, day).await?.last().copied())
    }

    /// Latest reading of every raw kind on `day`.
    ///
    /// # Errors
    /// Fails if any of the four raw series cannot be resolved.
    pub async fn live(&self, day: NaiveDate) -> Result<LiveSnapshot, DashError> {
        let (roof, balcony, consumption, grid) = futures::try_join!(
            self.latest(SeriesKind::Roof, day),
            self.latest(SeriesKind::Balcony, day),
            self.latest(SeriesKind::Consumption, day),
            self.latest(SeriesKind::Grid, day),
        )?;
        Ok(LiveSnapshot {
            day,
            roof,
            balcony,
            consumption,
            grid,
        })
    }

    /// Energy of `kind` on `day` in kWh.
    ///
    /// # Errors
    /// See [`SeriesStore::get`].
    pub async fn energy(&self, kind: SeriesKind, day: NaiveDate) -> Result<f64, DashError> {
        Ok(integrate(self.store.get(kind, day).await?.samples()))
    }

    /// Energy of every kind on `day`.
    ///
    /// # Errors
    /// Never fails for a valid day; unresolvable kinds are listed in `failures`.
    pub async fn summary(&self, day: NaiveDate) -> Result<EnergySummary, DashError> {
        self.summary_range(day, day).await
    }

    /// Energy of every kind summed over `from..=to`.
    ///
    /// A kind that fails on any day is reported in `failures` and left out of
    /// `energy_kwh`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `to < from`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pvdash::dashboard::summary_range", skip(self))
    )]
    pub async fn summary_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<EnergySummary, DashError> {
        let days = checked_days(from, to)?;
        let per_kind = futures::future::join_all(SeriesKind::ALL.into_iter().map(|kind| {
            let days = days.clone();
            async move {
                let totals = try_join_all(days.into_iter().map(|d| self.energy(kind, d))).await;
                (kind, totals.map(|v| v.into_iter().sum::<f64>()))
            }
        }))
        .await;

        let mut energy_kwh = BTreeMap::new();
        let mut failures = BTreeMap::new();
        for (kind, res) in per_kind {
            match res {
                Ok(v) => {
                    energy_kwh.insert(kind, v);
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(kind = %kind, error = %e, "kind left out of summary");
                    failures.insert(kind, e.to_string());
                }
            }
        }
        Ok(EnergySummary {
            from,
            to,
            energy_kwh,
            failures,
        })
    }
}

fn checked_days(from: NaiveDate, to: NaiveDate) -> Result<Vec<NaiveDate>, DashError> {
    if to < from {
        return Err(DashError::InvalidArg(format!(
            "range ends before it starts: {from} > {to}"
        )));
    }
    Ok(days_between(from, to))
}
