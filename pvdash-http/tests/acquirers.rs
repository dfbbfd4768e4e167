mod helpers;

use helpers::{BASIC, RESOURCE, STATION, TOKEN, day, rig};
use httpmock::prelude::*;
use pvdash_core::connector::{BulkSource, PointSource};
use pvdash_core::{DashError, MonthKey, Series, SeriesKind};
use serde_json::json;

const STATS_MARCH: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Statistics Name="Energie">
  <S T="2025-03-01 00:00:00" V="0.000" V2="0.300" V3="0.300"/>
  <S T="2025-03-01 00:15:00" V="0.000" V2="0.320" V3="0.320"/>
  <S T="2025-03-02 12:00:00" V="2.500" V2="0.400" V3="-2.100"/>
  <S T="2025-04-01 00:00:00" V="0.000" V2="0.310" V3="0.310"/>
</Statistics>"#;

#[tokio::test]
async fn point_request_carries_token_and_day_range() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/station/report/select_power_by_station")
                .header("authorization", TOKEN)
                .json_body(json!({
                    "sid_list": [STATION], "sid": STATION,
                    "start_date": "2025-03-01", "end_date": "2025-03-01",
                    "page": 1, "page_size": 100
                }));
            then.status(200).json_body(json!({"data": [{"data_list": [
                {"date": "12:00", "pv_power": "350.5"},
                {"date": "12:05", "pv_power": 360}
            ]}]}));
        })
        .await;
    let r = rig(&server);

    let s = r.sources.point.day(day(2025, 3, 1)).await.unwrap();
    m.assert_calls_async(1).await;
    assert_eq!(s.len(), 2);
    assert_eq!(s.first().unwrap().at, day(2025, 3, 1).and_hms_opt(12, 0, 0).unwrap());
    assert_eq!(s.last().unwrap().value, 360.0);
    assert!(r.status.current().is_none());
}

#[tokio::test]
async fn point_before_activation_skips_network() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(500);
        })
        .await;
    let r = rig(&server);

    let d = day(2024, 12, 15);
    assert_eq!(r.sources.point.day(d).await.unwrap(), Series::placeholder(d));
    m.assert_calls_async(0).await;
}

#[tokio::test]
async fn empty_point_payload_is_placeholder() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).json_body(json!({"data": []}));
        })
        .await;
    let r = rig(&server);
    let d = day(2025, 1, 5);
    assert_eq!(r.sources.point.day(d).await.unwrap(), Series::placeholder(d));
}

#[tokio::test]
async fn point_failure_is_reported_after_three_attempts() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(401).body("token expired");
        })
        .await;
    let r = rig(&server);

    let err = r.sources.point.day(day(2025, 3, 1)).await.unwrap_err();
    m.assert_calls_async(3).await;
    assert!(matches!(err, DashError::Network { status: Some(401), .. }));
    // The loading message is gone; the error stays visible.
    let shown = r.status.current().unwrap();
    assert!(shown.starts_with("[ERROR]"));
    assert_eq!(r.status.queued().len(), 1);
}

#[tokio::test]
async fn bulk_follows_alias_and_uses_basic_auth() {
    let server = MockServer::start_async().await;
    let alias = server
        .mock_async(|when, then| {
            when.method(GET).path("/alias");
            then.status(302).header("location", server.url("/host"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/host");
            then.status(200).body("miniserver");
        })
        .await;
    let stats = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("/host/stats/{RESOURCE}.202503.xml"))
                .header("authorization", BASIC);
            then.status(200).body(STATS_MARCH);
        })
        .await;
    let r = rig(&server);

    let bundle = r
        .sources
        .bulk
        .month(MonthKey::new(2025, 3).unwrap())
        .await
        .unwrap();

    alias.assert_calls_async(1).await;
    stats.assert_calls_async(1).await;
    assert_eq!(
        bundle.days().collect::<Vec<_>>(),
        vec![day(2025, 3, 1), day(2025, 3, 2)]
    );
    let roof = bundle.series(SeriesKind::Roof, day(2025, 3, 2)).unwrap();
    assert!((roof.first().unwrap().value - 2_500.0).abs() < 1e-9);
    let grid = bundle.series(SeriesKind::Grid, day(2025, 3, 1)).unwrap();
    assert_eq!(grid.len(), 2);
    assert!(bundle.day(day(2025, 4, 1)).is_none());
}

#[tokio::test]
async fn malformed_stats_are_a_parse_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/alias");
            then.status(200).body("");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("/alias/stats/{RESOURCE}.202503.xml"));
            then.status(200)
                .body(r#"<Statistics><S T="2025-03-01 00:00:00" V="x" V2="1" V3="1"/></Statistics>"#);
        })
        .await;
    let r = rig(&server);

    let err = r
        .sources
        .bulk
        .month(MonthKey::new(2025, 3).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, DashError::Parse { .. }));
    // The store that populates the key posts decode failures; the acquirer
    // only clears its progress message.
    assert!(r.status.queued().is_empty());
}
