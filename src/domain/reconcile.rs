// src/domain/reconcile.rs

use crate::domain::NewCountry;
use crate::errors::ServerError;
use crate::gateway::{RateTable, RawCountry};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Bounds of the per-record GDP multiplier, `[MIN, MAX)`.
pub const GDP_MULTIPLIER_MIN: f64 = 1000.0;
pub const GDP_MULTIPLIER_MAX: f64 = 2000.0;

/// Code of the first listed currency. Secondary currencies are ignored,
/// and a first entry without a usable code yields `None`.
pub fn primary_currency(raw: &RawCountry) -> Option<String> {
    raw.currencies
        .as_ref()
        .and_then(|list| list.first())
        .and_then(|c| c.code.as_deref())
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
}

/// `population * U / rate` with `U` drawn from `rng`; 0 when there is no rate.
pub fn estimate_gdp<R: Rng + ?Sized>(rng: &mut R, population: i64, rate: Option<f64>) -> f64 {
    match rate {
        Some(rate) => {
            let multiplier = rng.gen_range(GDP_MULTIPLIER_MIN..GDP_MULTIPLIER_MAX);
            population as f64 * multiplier / rate
        }
        None => 0.0,
    }
}

/// Turns one upstream entry into a storable record.
///
/// The join is on the primary currency code only. A code the rate table does
/// not know leaves `exchange_rate` empty, which in turn zeroes the GDP
/// estimate. `now` becomes `last_refreshed_at`.
pub fn reconcile<R: Rng + ?Sized>(
    raw: &RawCountry,
    rates: &RateTable,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<NewCountry, ServerError> {
    if raw.name.trim().is_empty() {
        return Err(ServerError::InvalidRecord("country entry without a name".into()));
    }

    let population = i64::try_from(raw.population).map_err(|_| {
        ServerError::InvalidRecord(format!(
            "population {} of {} is out of range",
            raw.population, raw.name
        ))
    })?;

    let currency_code = primary_currency(raw);
    let exchange_rate = currency_code.as_deref().and_then(|code| rates.rate_for(code));
    let estimated_gdp = estimate_gdp(rng, population, exchange_rate);

    Ok(NewCountry {
        name: raw.name.clone(),
        capital: raw.capital.clone(),
        region: raw.region.clone(),
        population,
        currency_code,
        exchange_rate,
        estimated_gdp,
        flag_url: raw.flag_url.clone(),
        last_refreshed_at: now,
    })
}
