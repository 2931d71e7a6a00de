use crate::db::{init_db, Database};
use crate::domain::CountryRecord;
use crate::gateway::{
    ExternalData, ExternalDataSource, GatewayError, RateTable, RawCountry, RawCurrency,
};
use crate::refresh::RefreshService;
use crate::responses::error_to_response;
use crate::router::{handle, AppState};
use crate::summary::{RenderError, SummaryRenderer};
use astra::{Body, Response};
use chrono::{DateTime, Utc};
use http::{Method, Request};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

static DB_SEQ: AtomicU64 = AtomicU64::new(0);

/// Fresh SQLite file per call, with the production schema applied.
pub fn init_test_db() -> Database {
    let path = std::env::temp_dir().join(format!(
        "country_exchange_test_{}_{}.sqlite",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos(),
        DB_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    let db = Database::new(path.to_string_lossy().into_owned());

    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    db
}

pub fn raw_country(name: &str, population: u64, codes: &[&str]) -> RawCountry {
    let (capital, region) = match name {
        "Nigeria" => ("Abuja", "Africa"),
        "Ghana" => ("Accra", "Africa"),
        "Togo" => ("Lomé", "Africa"),
        "France" => ("Paris", "Europe"),
        _ => ("Capital", "Other"),
    };
    RawCountry {
        name: name.to_string(),
        capital: Some(capital.to_string()),
        region: Some(region.to_string()),
        population,
        flag_url: Some(format!("https://flagcdn.com/{}.svg", name.to_lowercase())),
        currencies: Some(
            codes
                .iter()
                .map(|code| RawCurrency {
                    code: Some(code.to_string()),
                })
                .collect(),
        ),
    }
}

/// Serves the same payload on every fetch.
#[derive(Clone)]
pub struct FixedSource {
    data: ExternalData,
}

impl FixedSource {
    pub fn new(countries: Vec<RawCountry>, rates: &[(&str, f64)]) -> Self {
        let rates: RateTable = rates
            .iter()
            .map(|(code, rate)| (code.to_string(), *rate))
            .collect();
        Self {
            data: ExternalData { countries, rates },
        }
    }

    /// Nigeria and Ghana have rates; France's EUR is missing from the table.
    pub fn sample() -> Self {
        Self::new(
            vec![
                raw_country("Nigeria", 206_139_589, &["NGN"]),
                raw_country("Ghana", 31_072_940, &["GHS"]),
                raw_country("France", 67_391_582, &["EUR"]),
            ],
            &[("NGN", 1600.23), ("GHS", 15.34), ("USD", 1.0)],
        )
    }
}

impl ExternalDataSource for FixedSource {
    fn fetch(&self) -> Result<ExternalData, GatewayError> {
        Ok(self.data.clone())
    }
}

pub struct FailingSource;

impl ExternalDataSource for FailingSource {
    fn fetch(&self) -> Result<ExternalData, GatewayError> {
        Err(GatewayError::Network("connection refused".into()))
    }
}

/// Remembers how many records each render call saw.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    seen: Arc<Mutex<Vec<usize>>>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> Vec<usize> {
        self.seen.lock().unwrap().clone()
    }
}

impl SummaryRenderer for RecordingRenderer {
    fn render(
        &self,
        countries: &[CountryRecord],
        _generated_at: DateTime<Utc>,
    ) -> Result<(), RenderError> {
        self.seen.lock().unwrap().push(countries.len());
        Ok(())
    }
}

pub struct FailingRenderer;

impl SummaryRenderer for FailingRenderer {
    fn render(
        &self,
        _countries: &[CountryRecord],
        _generated_at: DateTime<Utc>,
    ) -> Result<(), RenderError> {
        Err(RenderError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only filesystem",
        )))
    }
}

/// App wired to a fresh database; the summary image path lives in `image_dir`.
pub fn test_app<S, R>(source: S, renderer: R, image_dir: &Path) -> AppState
where
    S: ExternalDataSource + 'static,
    R: SummaryRenderer + 'static,
{
    AppState {
        db: init_test_db(),
        refresh: RefreshService::new(Box::new(source), Box::new(renderer)),
        summary_image_path: image_dir.join("summary.png"),
    }
}

/// Run one request through the router, rendering errors the way `main` does.
pub fn send(app: &AppState, method: Method, uri: &str) -> Response {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    match handle(req, app) {
        Ok(resp) => resp,
        Err(err) => error_to_response(err),
    }
}

pub fn body_bytes(resp: Response) -> Vec<u8> {
    let mut bytes = Vec::new();
    resp.into_body().reader().read_to_end(&mut bytes).unwrap();
    bytes
}

pub fn body_json(resp: Response) -> Value {
    serde_json::from_slice(&body_bytes(resp)).expect("response body is not JSON")
}
