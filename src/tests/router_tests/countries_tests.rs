// src/tests/router_tests/countries_tests.rs

use crate::tests::utils::{body_json, send, test_app, FixedSource, RecordingRenderer};
use http::Method;

fn refreshed_app(dir: &std::path::Path) -> crate::router::AppState {
    let app = test_app(FixedSource::sample(), RecordingRenderer::default(), dir);
    let resp = send(&app, Method::POST, "/countries/refresh");
    assert_eq!(resp.status(), 200);
    app
}

#[test]
fn list_returns_every_country() {
    let dir = tempfile::tempdir().unwrap();
    let app = refreshed_app(dir.path());

    let resp = send(&app, Method::GET, "/countries");
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "application/json"
    );

    let body = body_json(resp);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0]["name"], "Nigeria");
    assert!(list[0]["created_at"].is_string());
}

#[test]
fn region_filter_is_exact_match() {
    let dir = tempfile::tempdir().unwrap();
    let app = refreshed_app(dir.path());

    let body = body_json(send(&app, Method::GET, "/countries?region=Africa"));
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Nigeria", "Ghana"]);

    let lower = body_json(send(&app, Method::GET, "/countries?region=africa"));
    assert!(lower.as_array().unwrap().is_empty());

    let partial = body_json(send(&app, Method::GET, "/countries?region=Afr"));
    assert!(partial.as_array().unwrap().is_empty());
}

#[test]
fn currency_filter_and_gdp_sort() {
    let dir = tempfile::tempdir().unwrap();
    let app = refreshed_app(dir.path());

    let eur = body_json(send(&app, Method::GET, "/countries?currency=EUR"));
    let eur = eur.as_array().unwrap();
    assert_eq!(eur.len(), 1);
    assert_eq!(eur[0]["name"], "France");
    assert!(eur[0]["exchange_rate"].is_null());
    assert_eq!(eur[0]["estimated_gdp"], 0.0);

    let sorted = body_json(send(&app, Method::GET, "/countries?sort=gdp_desc"));
    let gdps: Vec<f64> = sorted
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["estimated_gdp"].as_f64().unwrap())
        .collect();
    assert_eq!(gdps.len(), 3);
    assert!(gdps.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn unknown_sort_is_a_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = refreshed_app(dir.path());

    let resp = send(&app, Method::GET, "/countries?sort=population");
    assert_eq!(resp.status(), 400);
    assert_eq!(body_json(resp)["error"], "Validation failed");
}

#[test]
fn get_by_name_is_exact_and_case_sensitive() {
    let dir = tempfile::tempdir().unwrap();
    let app = refreshed_app(dir.path());

    let resp = send(&app, Method::GET, "/countries/Nigeria");
    assert_eq!(resp.status(), 200);
    let body = body_json(resp);
    assert_eq!(body["name"], "Nigeria");
    assert_eq!(body["capital"], "Abuja");
    assert_eq!(body["currency_code"], "NGN");
    assert_eq!(body["exchange_rate"], 1600.23);

    let resp = send(&app, Method::GET, "/countries/nigeria");
    assert_eq!(resp.status(), 404);
    assert_eq!(body_json(resp)["error"], "Country not found");
}

#[test]
fn names_with_spaces_are_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(
        FixedSource::new(
            vec![crate::tests::utils::raw_country("United States", 331_000_000, &["USD"])],
            &[("USD", 1.0)],
        ),
        RecordingRenderer::default(),
        dir.path(),
    );
    send(&app, Method::POST, "/countries/refresh");

    let resp = send(&app, Method::GET, "/countries/United%20States");
    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(resp)["currency_code"], "USD");
}

#[test]
fn delete_then_get_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = refreshed_app(dir.path());

    let resp = send(&app, Method::DELETE, "/countries/Ghana");
    assert_eq!(resp.status(), 204);

    let resp = send(&app, Method::GET, "/countries/Ghana");
    assert_eq!(resp.status(), 404);

    let resp = send(&app, Method::DELETE, "/countries/Ghana");
    assert_eq!(resp.status(), 404);
    assert_eq!(body_json(resp)["error"], "Country not found");

    let list = body_json(send(&app, Method::GET, "/countries"));
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[test]
fn unknown_route_is_json_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(FixedSource::sample(), RecordingRenderer::default(), dir.path());

    let resp = send(&app, Method::GET, "/nope");
    assert_eq!(resp.status(), 404);
    assert_eq!(body_json(resp)["error"], "Not found");

    let resp = send(&app, Method::PUT, "/countries/Nigeria");
    assert_eq!(resp.status(), 404);
}
