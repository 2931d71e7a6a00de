// client.rs
use crate::gateway::{
    ExternalData, ExternalDataSource, GatewayError, RateTable, RatesResponse, RawCountry,
};
use log::{debug, error};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("country_exchange/", env!("CARGO_PKG_VERSION"));

/// Fetches the country list and the rate table over HTTP.
pub struct HttpGateway {
    client: Client,
    countries_url: String,
    rates_url: String,
}

impl HttpGateway {
    pub fn new(
        countries_url: impl Into<String>,
        rates_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            client,
            countries_url: countries_url.into(),
            rates_url: rates_url.into(),
        })
    }

    pub fn fetch_countries(&self) -> Result<Vec<RawCountry>, GatewayError> {
        self.get_json(&self.countries_url)
    }

    pub fn fetch_rates(&self) -> Result<RateTable, GatewayError> {
        self.get_json::<RatesResponse>(&self.rates_url)?.into_table()
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GatewayError> {
        let start = std::time::Instant::now();

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp
            .bytes()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        debug!("GET {url} -> {status} ({} bytes in {:?})", body.len(), start.elapsed());

        serde_json::from_slice(&body).map_err(|e| GatewayError::Decode {
            url: url.to_string(),
            msg: e.to_string(),
        })
    }
}

impl ExternalDataSource for HttpGateway {
    /// Both requests run at once; neither result is used unless both succeed.
    fn fetch(&self) -> Result<ExternalData, GatewayError> {
        let (countries, rates) = std::thread::scope(|s| {
            let countries = s.spawn(|| self.fetch_countries());
            let rates = s.spawn(|| self.fetch_rates());
            (countries.join(), rates.join())
        });

        let countries = countries.map_err(|_| GatewayError::WorkerPanicked)?;
        let rates = rates.map_err(|_| GatewayError::WorkerPanicked)?;

        match (countries, rates) {
            (Ok(countries), Ok(rates)) => Ok(ExternalData { countries, rates }),
            (Err(e), _) | (_, Err(e)) => {
                error!("External fetch failed: {e}");
                Err(e)
            }
        }
    }
}
