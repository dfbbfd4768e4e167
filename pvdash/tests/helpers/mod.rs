// Shared fixtures for the pvdash integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use pvdash::{Dashboard, DashboardBuilder, MonthKey, StatusBoard, StoreConfig};
use pvdash_mock::{DynamicMockController, DynamicMockSource};

/// Construct a `NaiveDate` without unwrap noise in tests.
pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Construct a `MonthKey` without unwrap noise in tests.
pub fn month(y: i32, m: u32) -> MonthKey {
    MonthKey::new(y, m).expect("valid month")
}

/// Test rig: a dashboard over one dynamic mock serving both sources.
pub struct Rig {
    pub dash: Dashboard,
    pub ctl: DynamicMockController,
    pub status: Arc<StatusBoard>,
}

pub fn builder_with(source: &Arc<DynamicMockSource>) -> DashboardBuilder {
    Dashboard::builder()
        .point_source(source.clone())
        .bulk_source(source.clone())
}

pub fn rig_with(cfg: StoreConfig) -> Rig {
    let (source, ctl) = DynamicMockSource::new_with_controller("mock");
    let status = Arc::new(StatusBoard::new());
    let dash = builder_with(&source)
        .status(status.clone())
        .store_config(cfg)
        .build()
        .expect("dashboard builds");
    Rig { dash, ctl, status }
}

pub fn rig() -> Rig {
    rig_with(StoreConfig::default())
}

/// Rig whose sources take `delay` per call, so concurrent callers overlap.
pub async fn slow_rig(delay: Duration) -> Rig {
    let r = rig();
    r.ctl.set_delay(delay).await;
    r
}
