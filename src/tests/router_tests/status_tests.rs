// src/tests/router_tests/status_tests.rs

use crate::tests::utils::{body_json, send, test_app, FixedSource, RecordingRenderer};
use chrono::{DateTime, Utc};
use http::Method;

#[test]
fn empty_store_reports_zero_and_null() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(FixedSource::sample(), RecordingRenderer::default(), dir.path());

    let resp = send(&app, Method::GET, "/status");
    assert_eq!(resp.status(), 200);

    let body = body_json(resp);
    assert_eq!(body["total_countries"], 0);
    assert!(body["last_refreshed_at"].is_null());
}

#[test]
fn status_tracks_latest_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(FixedSource::sample(), RecordingRenderer::default(), dir.path());

    let before = Utc::now();
    send(&app, Method::POST, "/countries/refresh");

    let body = body_json(send(&app, Method::GET, "/status"));
    assert_eq!(body["total_countries"], 3);

    let stamp: DateTime<Utc> = body["last_refreshed_at"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(stamp.timestamp_micros() >= before.timestamp_micros());
    assert!(stamp <= Utc::now());
}
