// src/tests/router_tests/refresh_tests.rs

use crate::db::CountryStore;
use crate::tests::utils::{
    body_json, send, test_app, FailingRenderer, FailingSource, FixedSource, RecordingRenderer,
};
use http::Method;

#[test]
fn refresh_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = RecordingRenderer::default();
    let app = test_app(FixedSource::sample(), renderer.clone(), dir.path());

    let resp = send(&app, Method::POST, "/countries/refresh");
    assert_eq!(resp.status(), 200);

    let body = body_json(resp);
    assert_eq!(body["message"], "Data refreshed successfully");
    assert_eq!(body["processed"], 3);
    assert_eq!(body["inserted"], 3);
    assert_eq!(body["updated"], 0);
    assert!(body.get("warning").is_none());
    assert_eq!(renderer.calls(), vec![3]);
}

#[test]
fn repeated_refresh_keeps_one_row_per_name() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(FixedSource::sample(), RecordingRenderer::default(), dir.path());

    send(&app, Method::POST, "/countries/refresh");
    let body = body_json(send(&app, Method::POST, "/countries/refresh"));

    assert_eq!(body["inserted"], 0);
    assert_eq!(body["updated"], 3);
    assert_eq!(app.db.count().unwrap(), 3);
}

#[test]
fn upstream_failure_is_503_with_details() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(FailingSource, RecordingRenderer::default(), dir.path());

    let resp = send(&app, Method::POST, "/countries/refresh");
    assert_eq!(resp.status(), 503);

    let body = body_json(resp);
    assert_eq!(body["error"], "External data source unavailable");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
    assert_eq!(app.db.count().unwrap(), 0);
}

#[test]
fn renderer_failure_still_succeeds_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(FixedSource::sample(), FailingRenderer, dir.path());

    let resp = send(&app, Method::POST, "/countries/refresh");
    assert_eq!(resp.status(), 200);

    let body = body_json(resp);
    assert_eq!(body["inserted"], 3);
    assert!(body["warning"]
        .as_str()
        .unwrap()
        .contains("read-only filesystem"));
}

#[test]
fn refresh_requires_post() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(FixedSource::sample(), RecordingRenderer::default(), dir.path());

    // GET falls through to the by-name lookup
    let resp = send(&app, Method::GET, "/countries/refresh");
    assert_eq!(resp.status(), 404);
    assert_eq!(app.db.count().unwrap(), 0);
}
