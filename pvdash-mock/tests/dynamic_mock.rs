use std::time::Duration;

use chrono::NaiveDate;
use pvdash_core::connector::{BulkSource, PointSource};
use pvdash_core::{DashError, MonthKey, Sample, Series};
use pvdash_mock::{DynamicMockSource, MockBehavior, MockSource};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

#[tokio::test]
async fn test_mock_point_return() {
    let (mock, controller) = DynamicMockSource::new_with_controller("P0");
    let s = Series::new(vec![Sample::new(
        day(1).and_hms_opt(12, 0, 0).unwrap(),
        42.0,
    )]);
    controller
        .set_point_behavior(day(1), MockBehavior::Return(s.clone()))
        .await;

    let got = mock.day(day(1)).await.expect("point ok");
    assert_eq!(got, s);
    assert_eq!(controller.point_requests().await, vec![day(1)]);
}

#[tokio::test]
async fn test_mock_bulk_fail() {
    let (mock, controller) = DynamicMockSource::new_with_controller("P0");
    let march = MonthKey::new(2025, 3).unwrap();
    let err = DashError::network("https://mock/stats", Some(500), "boom");
    controller
        .set_bulk_behavior(march, MockBehavior::Fail(err.clone()))
        .await;

    let got = mock.month(march).await.expect_err("err");
    assert_eq!(got, err);
    assert_eq!(controller.bulk_requests().await, vec![march]);
}

#[tokio::test]
async fn test_mock_fallback_serves_fixtures() {
    let (mock, controller) = DynamicMockSource::new_with_controller("P0");
    let bundle = mock.month(MonthKey::new(2025, 3).unwrap()).await.unwrap();
    assert_eq!(bundle.len(), 31);
    controller
        .set_point_fallback(Some(MockBehavior::Fail(DashError::auth("expired"))))
        .await;
    assert!(matches!(mock.day(day(2)).await, Err(DashError::Auth(_))));
}

#[tokio::test(start_paused = true)]
async fn test_mock_hang_never_resolves() {
    let (mock, controller) = DynamicMockSource::new_with_controller("P0");
    controller.set_point_behavior(day(3), MockBehavior::Hang).await;
    let res = tokio::time::timeout(Duration::from_secs(5), mock.day(day(3))).await;
    assert!(res.is_err());
}

#[tokio::test]
async fn test_mock_clear_all_resets_logs() {
    let (mock, controller) = DynamicMockSource::new_with_controller("P0");
    let _ = mock.day(day(4)).await;
    controller.clear_all_behaviors().await;
    assert!(controller.point_requests().await.is_empty());
}

#[tokio::test]
async fn test_static_mock_placeholder_before_activation() {
    let mock = MockSource::new();
    let early = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
    assert_eq!(mock.day(early).await.unwrap(), Series::placeholder(early));
    assert!(mock.day(day(1)).await.unwrap().len() > 1);
}
