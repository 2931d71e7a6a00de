// refresh.rs
use crate::db::CountryStore;
use crate::domain::{reconcile, CountryFilter, NewCountry};
use crate::errors::ServerError;
use crate::gateway::ExternalDataSource;
use crate::summary::SummaryRenderer;
use chrono::Utc;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Inserted,
    Updated,
}

/// Outcome of one refresh run, returned to the caller as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshReport {
    pub processed: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Set when the summary image could not be produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Drives fetch -> reconcile -> upsert -> render.
pub struct RefreshService {
    source: Box<dyn ExternalDataSource>,
    renderer: Box<dyn SummaryRenderer>,
    gdp_seed: Option<u64>,
    // One refresh at a time per process.
    running: Mutex<()>,
}

impl RefreshService {
    pub fn new(source: Box<dyn ExternalDataSource>, renderer: Box<dyn SummaryRenderer>) -> Self {
        Self {
            source,
            renderer,
            gdp_seed: None,
            running: Mutex::new(()),
        }
    }

    pub fn with_gdp_seed(mut self, seed: Option<u64>) -> Self {
        self.gdp_seed = seed;
        self
    }

    /// Pulls both upstream datasets and upserts every country in upstream
    /// order.
    ///
    /// Nothing is written if the fetch fails. A store failure stops the
    /// batch where it is; earlier rows stay committed. Countries missing from
    /// the fetch are left alone. The summary renderer runs once at the end
    /// and its failure only produces a warning.
    pub fn refresh<S>(&self, store: &S) -> Result<RefreshReport, ServerError>
    where
        S: CountryStore + ?Sized,
    {
        let _guard = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        info!("Refresh started");

        let data = self.source.fetch().map_err(|e| {
            error!("Refresh aborted, upstream unavailable: {e}");
            ServerError::ExternalDataUnavailable(e.to_string())
        })?;

        info!(
            "Fetched {} countries and {} exchange rates (base {})",
            data.countries.len(),
            data.rates.len(),
            data.rates.base_code.as_deref().unwrap_or("unknown")
        );

        let mut rng = match self.gdp_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut report = RefreshReport::default();
        for raw in &data.countries {
            let country = reconcile(raw, &data.rates, &mut rng, Utc::now())?;
            match upsert(store, &country) {
                Ok(Upserted::Inserted) => report.inserted += 1,
                Ok(Upserted::Updated) => report.updated += 1,
                Err(e) => {
                    error!(
                        "Refresh stopped at {} after {} countries: {e}",
                        country.name, report.processed
                    );
                    return Err(e);
                }
            }
            report.processed += 1;
        }

        report.warning = self.render_summary(store);

        info!(
            "Refresh finished: {} processed, {} inserted, {} updated",
            report.processed, report.inserted, report.updated
        );
        Ok(report)
    }

    fn render_summary<S>(&self, store: &S) -> Option<String>
    where
        S: CountryStore + ?Sized,
    {
        let outcome = store
            .find_all(&CountryFilter::all())
            .map_err(|e| e.to_string())
            .and_then(|all| {
                self.renderer
                    .render(&all, Utc::now())
                    .map_err(|e| e.to_string())
            });

        match outcome {
            Ok(()) => None,
            Err(msg) => {
                warn!("Summary image not generated: {msg}");
                Some(format!("summary image not generated: {msg}"))
            }
        }
    }
}

/// Find by exact name, then update in full or insert.
///
/// A row deleted between the lookup and the update is inserted again.
pub fn upsert<S>(store: &S, country: &NewCountry) -> Result<Upserted, ServerError>
where
    S: CountryStore + ?Sized,
{
    if let Some(existing) = store.find_by_name(&country.name)? {
        match store.update(&existing, country) {
            Ok(_) => {
                debug!("Updated {}", country.name);
                return Ok(Upserted::Updated);
            }
            Err(ServerError::NotFound) => {
                warn!("{} was deleted during refresh, inserting it again", country.name);
            }
            Err(e) => return Err(e),
        }
    }

    store.insert(country)?;
    debug!("Inserted {}", country.name);
    Ok(Upserted::Inserted)
}
