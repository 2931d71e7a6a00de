use serde::Deserialize;
use std::collections::HashMap;

use super::GatewayError;

// country
//  ├── name
//  ├── capital
//  ├── region
//  ├── population
//  ├── flag
//  └── currencies[]
//       └── code          (name, symbol ignored)

#[derive(Debug, Clone, Deserialize)]
pub struct RawCountry {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: u64,
    #[serde(rename = "flag")]
    pub flag_url: Option<String>,
    pub currencies: Option<Vec<RawCurrency>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCurrency {
    pub code: Option<String>,
}

/// Body of the `latest/<BASE>` exchange-rate endpoint.
#[derive(Debug, Deserialize)]
pub struct RatesResponse {
    pub result: Option<String>,
    pub base_code: Option<String>,
    #[serde(default)]
    pub rates: HashMap<String, f64>,
    #[serde(rename = "error-type")]
    pub error_type: Option<String>,
}

impl RatesResponse {
    /// Only an explicit `"result": "error"` is a failure. An empty `rates`
    /// map is accepted and leaves every country without a rate.
    pub fn into_table(self) -> Result<RateTable, GatewayError> {
        if self.result.as_deref() == Some("error") {
            let kind = self.error_type.unwrap_or_else(|| "unknown".to_string());
            return Err(GatewayError::Upstream(format!("rates endpoint: {kind}")));
        }
        Ok(RateTable {
            base_code: self.base_code,
            rates: self.rates,
        })
    }
}

/// Currency code -> units of that currency per one unit of the base currency.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    pub base_code: Option<String>,
    rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn new(base_code: Option<String>, rates: HashMap<String, f64>) -> Self {
        Self { base_code, rates }
    }

    /// Usable rate for `code`. Zero, negative and non-finite rates count as missing.
    pub fn rate_for(&self, code: &str) -> Option<f64> {
        self.rates
            .get(code)
            .copied()
            .filter(|r| r.is_finite() && *r > 0.0)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }
}

impl FromIterator<(String, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self::new(None, iter.into_iter().collect())
    }
}

/// Both upstream datasets, fetched together.
#[derive(Debug, Clone)]
pub struct ExternalData {
    pub countries: Vec<RawCountry>,
    pub rates: RateTable,
}
