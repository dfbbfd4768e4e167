use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use pvdash_core::connector::{BulkSource, PointSource};
use pvdash_core::{DashError, MonthBundle, MonthKey, Series};

use crate::fixtures;

/// Instruction for how a source call should behave for a given input.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value.
    Return(T),
    /// Fail with the provided error.
    Fail(DashError),
    /// Hang indefinitely (simulate a stalled upstream).
    Hang,
}

#[derive(Default)]
struct InternalState {
    point_rules: HashMap<NaiveDate, MockBehavior<Series>>,
    bulk_rules: HashMap<MonthKey, MockBehavior<MonthBundle>>,
    point_fallback: Option<MockBehavior<Series>>,
    bulk_fallback: Option<MockBehavior<MonthBundle>>,
    point_requests: Vec<NaiveDate>,
    bulk_requests: Vec<MonthKey>,
    delay: Duration,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior of point calls for one day.
    pub async fn set_point_behavior(&self, day: NaiveDate, behavior: MockBehavior<Series>) {
        let mut guard = self.state.lock().await;
        guard.point_rules.insert(day, behavior);
    }

    /// Set the behavior of bulk calls for one month.
    pub async fn set_bulk_behavior(&self, month: MonthKey, behavior: MockBehavior<MonthBundle>) {
        let mut guard = self.state.lock().await;
        guard.bulk_rules.insert(month, behavior);
    }

    /// Behavior for point days without a specific rule; `None` serves fixtures.
    pub async fn set_point_fallback(&self, behavior: Option<MockBehavior<Series>>) {
        self.state.lock().await.point_fallback = behavior;
    }

    /// Behavior for bulk months without a specific rule; `None` serves fixtures.
    pub async fn set_bulk_fallback(&self, behavior: Option<MockBehavior<MonthBundle>>) {
        self.state.lock().await.bulk_fallback = behavior;
    }

    /// Delay applied to every call before its behavior runs.
    pub async fn set_delay(&self, delay: Duration) {
        self.state.lock().await.delay = delay;
    }

    /// Days requested from the point source, in call order.
    pub async fn point_requests(&self) -> Vec<NaiveDate> {
        self.state.lock().await.point_requests.clone()
    }

    /// Months requested from the bulk source, in call order.
    pub async fn bulk_requests(&self) -> Vec<MonthKey> {
        self.state.lock().await.bulk_requests.clone()
    }

    /// Clear all configured behaviors, request logs and the delay.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        *guard = InternalState::default();
    }
}

/// A source that defers all behavior to an external controller.
///
/// Implements both [`PointSource`] and [`BulkSource`]; calls without a rule
/// are answered from [`fixtures`].
pub struct DynamicMockSource {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockSource {
    /// Create a new dynamic mock source and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<Self>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        (Arc::new(Self { name, state }), controller)
    }

    async fn run<T>(
        delay: Duration,
        behavior: Option<MockBehavior<T>>,
        fixture: impl FnOnce() -> T + Send,
    ) -> Result<T, DashError> {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match behavior {
            None => Ok(fixture()),
            Some(MockBehavior::Return(v)) => Ok(v),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => std::future::pending().await,
        }
    }
}

#[async_trait]
impl PointSource for DynamicMockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn day(&self, day: NaiveDate) -> Result<Series, DashError> {
        // Snapshot behavior without holding the lock across await points
        let (delay, behavior) = {
            let mut guard = self.state.lock().await;
            guard.point_requests.push(day);
            let b = guard
                .point_rules
                .get(&day)
                .cloned()
                .or_else(|| guard.point_fallback.clone());
            (guard.delay, b)
        };
        Self::run(delay, behavior, || fixtures::balcony_day(day)).await
    }
}

#[async_trait]
impl BulkSource for DynamicMockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn month(&self, month: MonthKey) -> Result<MonthBundle, DashError> {
        let (delay, behavior) = {
            let mut guard = self.state.lock().await;
            guard.bulk_requests.push(month);
            let b = guard
                .bulk_rules
                .get(&month)
                .cloned()
                .or_else(|| guard.bulk_fallback.clone());
            (guard.delay, b)
        };
        Self::run(delay, behavior, || fixtures::month_bundle(month)).await
    }
}
