use crate::db::{CountryStore, Database};
use crate::domain::{CountryFilter, SortOrder};
use crate::errors::ServerError;
use crate::refresh::{RefreshReport, RefreshService};
use crate::responses::{json_error, json_response, no_content, png_response, ResultResp};
use astra::Request;
use chrono::{DateTime, Utc};
use log::{error, info};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Everything a request handler may touch, built once in `main`.
pub struct AppState {
    pub db: Database,
    pub refresh: RefreshService,
    pub summary_image_path: PathBuf,
}

#[derive(Debug, Serialize)]
struct RefreshBody<'a> {
    message: &'static str,
    #[serde(flatten)]
    report: &'a RefreshReport,
}

#[derive(Debug, Serialize)]
struct StatusBody {
    total_countries: i64,
    last_refreshed_at: Option<DateTime<Utc>>,
}

pub fn handle(req: Request, app: &AppState) -> ResultResp {
    let method = req.method().as_str();
    let path = req.uri().path();
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (method, segments.as_slice()) {
        ("POST", ["countries", "refresh"]) => refresh_countries(app),
        ("GET", ["countries"]) => list_countries(&req, app),
        ("GET", ["countries", "image"]) => summary_image(app),
        ("GET", ["countries", name]) => get_country(app, name),
        ("DELETE", ["countries", name]) => delete_country(app, name),
        ("GET", ["status"]) => status(app),
        _ => Err(ServerError::NotFound),
    }
}

fn refresh_countries(app: &AppState) -> ResultResp {
    let report = app.refresh.refresh(&app.db)?;

    let body = RefreshBody {
        message: "Data refreshed successfully",
        report: &report,
    };
    json_response(200, &body)
}

fn list_countries(req: &Request, app: &AppState) -> ResultResp {
    let params = parse_query(req);
    let filter = filter_from_query(&params)?;
    let countries = app.db.find_all(&filter)?;
    json_response(200, &countries)
}

fn get_country(app: &AppState, raw_name: &str) -> ResultResp {
    let name = decode_segment(raw_name)?;
    match app.db.find_by_name(&name)? {
        Some(country) => json_response(200, &country),
        None => Ok(json_error(404, "Country not found", None)),
    }
}

fn delete_country(app: &AppState, raw_name: &str) -> ResultResp {
    let name = decode_segment(raw_name)?;
    let Some(country) = app.db.find_by_name(&name)? else {
        return Ok(json_error(404, "Country not found", None));
    };
    app.db.delete(&country)?;
    info!("Deleted country {name}");
    no_content()
}

fn status(app: &AppState) -> ResultResp {
    let body = StatusBody {
        total_countries: app.db.count()?,
        last_refreshed_at: app.db.max_last_refreshed_at()?,
    };
    json_response(200, &body)
}

fn summary_image(app: &AppState) -> ResultResp {
    match std::fs::read(&app.summary_image_path) {
        Ok(bytes) => png_response(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Ok(json_error(404, "Summary image not found", None))
        }
        Err(e) => {
            error!("Reading {} failed: {e}", app.summary_image_path.display());
            Err(ServerError::InternalError)
        }
    }
}

/// Empty values are treated as absent, like a missing key.
fn filter_from_query(params: &HashMap<String, String>) -> Result<CountryFilter, ServerError> {
    let value = |key: &str| params.get(key).filter(|v| !v.is_empty()).cloned();

    let mut filter = CountryFilter::all();
    if let Some(region) = value("region") {
        filter = filter.region(region);
    }
    if let Some(code) = value("currency") {
        filter = filter.currency(code);
    }
    if let Some(raw) = value("sort") {
        let sort = SortOrder::parse(&raw).ok_or_else(|| {
            ServerError::BadRequest(format!("unsupported sort '{raw}', expected 'gdp_desc'"))
        })?;
        filter = filter.sorted(sort);
    }
    Ok(filter)
}

fn decode_segment(raw: &str) -> Result<String, ServerError> {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .map_err(|_| ServerError::BadRequest("country name is not valid UTF-8".into()))
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}
