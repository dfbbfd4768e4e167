//! Single-flight series cache.
//!
//! Every `(kind, day)` key moves through `Absent → Pending → Ready`. The
//! transition to `Pending` happens under a synchronous lock, so exactly one
//! caller (the populator) fetches or derives a key while every other caller
//! waits on a per-key watch channel and is woken when the value is published.
//!
//! Failures release the key. With a non-zero `failure_cooldown` the key is
//! parked in a `Failed` slot that answers with the recorded error until the
//! cooldown expires; afterwards it behaves like `Absent`.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use futures::future::{BoxFuture, FutureExt, Shared};
use pvdash_core::{
    BulkSource, DashError, MonthBundle, MonthKey, Origin, PointSource, Series, SeriesKind,
    StatusSink, StoreConfig,
};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::derive;

/// Address of one cached series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    /// Series kind.
    pub kind: SeriesKind,
    /// Day the series covers.
    pub day: NaiveDate,
}

impl SeriesKey {
    /// Build a key.
    #[must_use]
    pub const fn new(kind: SeriesKind, day: NaiveDate) -> Self {
        Self { kind, day }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.day.format("%Y-%m-%d"))
    }
}

/// Observable state of a key, mainly for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Never requested, or released after a failure.
    Absent,
    /// A populator is in flight.
    Pending,
    /// Value published; immutable from now on.
    Ready,
    /// Last population failed and the cooldown has not expired yet.
    Failed,
}

type Outcome = Option<Result<Arc<Series>, DashError>>;
type MonthFuture = Shared<BoxFuture<'static, Result<Arc<MonthBundle>, DashError>>>;

enum Slot {
    Pending {
        id: u64,
        tx: Arc<watch::Sender<Outcome>>,
    },
    Ready(Arc<Series>),
    Failed {
        error: DashError,
        until: Instant,
    },
}

enum Step<'a> {
    Hit(Arc<Series>),
    Fail(DashError),
    Wait(watch::Receiver<Outcome>),
    Populate(PopulateGuard<'a>),
}

/// Cache of every series the dashboard has resolved in this session.
///
/// Owned by the application context and shared by handle; the store never
/// registers itself globally.
pub struct SeriesStore {
    slots: Mutex<HashMap<SeriesKey, Slot>>,
    months: Mutex<HashMap<MonthKey, (u64, MonthFuture)>>,
    point: Arc<dyn PointSource>,
    bulk: Arc<dyn BulkSource>,
    status: Arc<dyn StatusSink>,
    cfg: StoreConfig,
    next_id: AtomicU64,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SeriesStore {
    /// Build a store over the two upstream sources.
    pub fn new(
        point: Arc<dyn PointSource>,
        bulk: Arc<dyn BulkSource>,
        status: Arc<dyn StatusSink>,
        cfg: StoreConfig,
    ) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            months: Mutex::new(HashMap::new()),
            point,
            bulk,
            status,
            cfg,
            next_id: AtomicU64::new(1),
        }
    }

    /// Configuration the store was built with.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    /// Status sink shared with the populators.
    #[must_use]
    pub fn status(&self) -> &Arc<dyn StatusSink> {
        &self.status
    }

    /// Resolve `kind` for `day`.
    ///
    /// Returns the cached value when ready, waits for an in-flight population
    /// otherwise, and populates the key itself when nobody else is doing so.
    /// Derived kinds resolve their dependencies through this same method.
    ///
    /// Behavior and trade-offs:
    /// - A failed population is returned to the populator and to every caller
    ///   waiting on the same key; the key is released for a later retry.
    /// - If `get_timeout` is configured the whole call is bounded by it. When
    ///   the populator itself times out its waiters receive `Abandoned`.
    ///
    /// # Errors
    /// Propagates upstream failures (`Network`, `Parse`, `Auth`, ...), or
    /// `RequestTimeout` / `Abandoned` as described above.
    pub fn get(
        &self,
        kind: SeriesKind,
        day: NaiveDate,
    ) -> BoxFuture<'_, Result<Arc<Series>, DashError>> {
        let key = SeriesKey::new(kind, day);
        async move {
            match self.cfg.get_timeout {
                Some(limit) => tokio::time::timeout(limit, self.resolve(key))
                    .await
                    .unwrap_or_else(|_| Err(DashError::request_timeout(key.to_string()))),
                None => self.resolve(key).await,
            }
        }
        .boxed()
    }

    /// Cached value of a key, without triggering population.
    #[must_use]
    pub fn peek(&self, kind: SeriesKind, day: NaiveDate) -> Option<Arc<Series>> {
        match lock(&self.slots).get(&SeriesKey::new(kind, day)) {
            Some(Slot::Ready(v)) => Some(Arc::clone(v)),
            _ => None,
        }
    }

    /// Current state of a key.
    #[must_use]
    pub fn state(&self, kind: SeriesKind, day: NaiveDate) -> SlotState {
        match lock(&self.slots).get(&SeriesKey::new(kind, day)) {
            None => SlotState::Absent,
            Some(Slot::Pending { .. }) => SlotState::Pending,
            Some(Slot::Ready(_)) => SlotState::Ready,
            Some(Slot::Failed { until, .. }) if *until > Instant::now() => SlotState::Failed,
            Some(Slot::Failed { .. }) => SlotState::Absent,
        }
    }

    /// Number of ready keys.
    #[must_use]
    pub fn ready_len(&self) -> usize {
        lock(&self.slots)
            .values()
            .filter(|s| matches!(s, Slot::Ready(_)))
            .count()
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "pvdash::store::resolve",
            skip(self, key),
            fields(key = %key),
        )
    )]
    async fn resolve(&self, key: SeriesKey) -> Result<Arc<Series>, DashError> {
        match self.elect(key) {
            Step::Hit(v) => Ok(v),
            Step::Fail(e) => Err(e),
            Step::Wait(rx) => Self::wait(key, rx).await,
            Step::Populate(guard) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(key = %key, "elected populator");
                let result = self.populate(key).await;
                guard.finish(result)
            }
        }
    }

    // Check-and-flip under the lock; nothing in here awaits.
    fn elect(&self, key: SeriesKey) -> Step<'_> {
        let mut slots = lock(&self.slots);
        match slots.get(&key) {
            Some(Slot::Ready(v)) => return Step::Hit(Arc::clone(v)),
            Some(Slot::Pending { tx, .. }) => return Step::Wait(tx.subscribe()),
            Some(Slot::Failed { error, until }) if *until > Instant::now() => {
                return Step::Fail(error.clone());
            }
            Some(Slot::Failed { .. }) | None => {}
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, _rx) = watch::channel(None);
        let tx = Arc::new(tx);
        slots.insert(
            key,
            Slot::Pending {
                id,
                tx: Arc::clone(&tx),
            },
        );
        Step::Populate(PopulateGuard {
            store: self,
            key,
            id,
            tx,
            done: false,
        })
    }

    async fn wait(key: SeriesKey, mut rx: watch::Receiver<Outcome>) -> Result<Arc<Series>, DashError> {
        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(v) => v.clone(),
            Err(_) => None,
        };
        outcome.unwrap_or_else(|| {
            Err(DashError::Abandoned {
                key: key.to_string(),
            })
        })
    }

    async fn populate(&self, key: SeriesKey) -> Result<Arc<Series>, DashError> {
        match key.kind.origin() {
            Origin::Point => {
                let out = self.point.day(key.day).await.map(Arc::new);
                if let Err(e) = &out {
                    self.report(e);
                }
                out
            }
            Origin::Bulk => self.populate_bulk(key).await,
            Origin::Derived => derive::derive(self, key.kind, key.day).await.map(Arc::new),
        }
    }

    /// Join (or start) the fetch of the key's month, then publish the month.
    ///
    /// Concurrent misses across bulk kinds and days of the same month await a
    /// single upstream request. The first awaiter to finish publishes every day
    /// of the bundle while still holding the month lock, so a populator that
    /// finds no fetch in flight can trust a missing publication.
    async fn populate_bulk(&self, key: SeriesKey) -> Result<Arc<Series>, DashError> {
        let month = MonthKey::of(key.day);
        let (id, fut) = {
            let mut months = lock(&self.months);
            if let Some((id, fut)) = months.get(&month) {
                (*id, fut.clone())
            } else {
                // published by a sibling fetch after this key was elected
                if let Some(v) = self.peek(key.kind, key.day) {
                    return Ok(v);
                }
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let bulk = Arc::clone(&self.bulk);
                let fut = async move { bulk.month(month).await.map(Arc::new) }
                    .boxed()
                    .shared();
                months.insert(month, (id, fut.clone()));
                #[cfg(feature = "tracing")]
                tracing::debug!(month = %month, source = self.bulk.name(), "starting bulk fetch");
                (id, fut)
            }
        };
        let out = fut.await;
        {
            let mut months = lock(&self.months);
            if months.get(&month).is_some_and(|(cur, _)| *cur == id) {
                match &out {
                    Ok(bundle) => self.publish_month(bundle, key.day),
                    Err(e) => self.report(e),
                }
                months.remove(&month);
            }
        }
        let bundle = out?;
        Ok(Arc::new(
            bundle.series(key.kind, key.day).unwrap_or_default(),
        ))
    }

    // Network failures were already posted by the fetcher that gave up.
    fn report(&self, e: &DashError) {
        if !matches!(e, DashError::Network { .. }) {
            self.status.error(&e.to_string());
        }
    }

    /// Fill every absent, failed or pending key the bundle covers. Ready keys
    /// are left alone.
    ///
    /// Days without rows in the payload (the requested one and any other day
    /// with a bulk key in flight) are published as empty series for every bulk
    /// kind, so sibling kinds do not refetch the month.
    fn publish_month(&self, bundle: &MonthBundle, requested: NaiveDate) {
        let mut slots = lock(&self.slots);
        let mut missing: Vec<NaiveDate> = slots
            .iter()
            .filter(|(k, slot)| {
                matches!(slot, Slot::Pending { .. })
                    && k.kind.origin() == Origin::Bulk
                    && bundle.month().contains(k.day)
            })
            .map(|(k, _)| k.day)
            .chain(std::iter::once(requested))
            .filter(|d| bundle.day(*d).is_none())
            .collect();
        missing.sort_unstable();
        missing.dedup();
        let days: Vec<NaiveDate> = bundle.days().chain(missing).collect();
        for day in days {
            for kind in SeriesKind::BULK {
                let key = SeriesKey::new(kind, day);
                if matches!(slots.get(&key), Some(Slot::Ready(_))) {
                    continue;
                }
                let value = Arc::new(bundle.series(kind, day).unwrap_or_default());
                if let Some(Slot::Pending { tx, .. }) =
                    slots.insert(key, Slot::Ready(Arc::clone(&value)))
                {
                    tx.send_replace(Some(Ok(value)));
                }
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(month = %bundle.month(), days = bundle.len(), "published month");
    }
}

/// Held by the elected populator; releases the key if population never finishes.
struct PopulateGuard<'a> {
    store: &'a SeriesStore,
    key: SeriesKey,
    id: u64,
    tx: Arc<watch::Sender<Outcome>>,
    done: bool,
}

impl PopulateGuard<'_> {
    fn finish(mut self, result: Result<Arc<Series>, DashError>) -> Result<Arc<Series>, DashError> {
        self.done = true;
        let mut slots = lock(&self.store.slots);
        let ours = matches!(slots.get(&self.key), Some(Slot::Pending { id, .. }) if *id == self.id);
        if !ours {
            // A sibling publication already made the key ready.
            if let Some(Slot::Ready(v)) = slots.get(&self.key) {
                return Ok(Arc::clone(v));
            }
            return result;
        }
        match &result {
            Ok(v) => {
                slots.insert(self.key, Slot::Ready(Arc::clone(v)));
            }
            Err(e) => {
                let cooldown = self.store.cfg.failure_cooldown;
                if cooldown.is_zero() {
                    slots.remove(&self.key);
                } else {
                    slots.insert(
                        self.key,
                        Slot::Failed {
                            error: e.clone(),
                            until: Instant::now() + cooldown,
                        },
                    );
                }
                #[cfg(feature = "tracing")]
                tracing::warn!(key = %self.key, error = %e, "population failed; key released");
            }
        }
        drop(slots);
        self.tx.send_replace(Some(result.clone()));
        result
    }
}

impl Drop for PopulateGuard<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let mut slots = lock(&self.store.slots);
        if matches!(slots.get(&self.key), Some(Slot::Pending { id, .. }) if *id == self.id) {
            slots.remove(&self.key);
            drop(slots);
            #[cfg(feature = "tracing")]
            tracing::warn!(key = %self.key, "populator dropped; key released");
            self.tx.send_replace(Some(Err(DashError::Abandoned {
                key: self.key.to_string(),
            })));
        }
    }
}
