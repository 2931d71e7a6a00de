use crate::config::AppConfig;
use crate::db::{init_db, Database};
use crate::gateway::HttpGateway;
use crate::refresh::RefreshService;
use crate::responses::error_to_response;
use crate::router::{handle, AppState};
use crate::summary::PngSummary;
use astra::Server;
use log::{error, info};
use std::time::Duration;

mod config;
mod db;
mod domain;
mod errors;
mod gateway;
mod refresh;
mod responses;
mod router;
mod summary;

#[cfg(test)]
mod tests;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1️⃣ Settings
    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // 2️⃣ Database handle + schema
    let db = Database::new(&cfg.database_path);
    if let Err(e) = init_db(&db) {
        error!("Database initialization failed: {e}");
        std::process::exit(1);
    }

    // 3️⃣ Upstream client and summary renderer, owned by the refresh service
    let gateway = match HttpGateway::new(
        &cfg.countries_url,
        &cfg.rates_url,
        Duration::from_secs(cfg.http_timeout_secs),
    ) {
        Ok(gw) => gw,
        Err(e) => {
            error!("HTTP client setup failed: {e}");
            std::process::exit(1);
        }
    };
    let summary = PngSummary::new(&cfg.summary_image_path);
    info!("Summary image will be written to {}", summary.path().display());

    let refresh =
        RefreshService::new(Box::new(gateway), Box::new(summary)).with_gdp_seed(cfg.gdp_seed);
    if cfg.gdp_seed.is_some() {
        info!("GDP multipliers are seeded; refreshes are reproducible");
    }

    let app = AppState {
        db,
        refresh,
        summary_image_path: cfg.summary_image_path.clone(),
    };

    // 4️⃣ Start the server
    let addr = match cfg.bind_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid bind address {}:{}: {e}", cfg.host, cfg.port);
            std::process::exit(1);
        }
    };
    info!("Starting server at http://{addr}");

    let server = Server::bind(&addr).max_workers(cfg.max_workers);

    let result = server.serve(move |req, _info| match handle(req, &app) {
        Ok(resp) => resp,
        Err(err) => error_to_response(err),
    });

    if let Err(e) = result {
        error!("Server ended with error: {e}");
    }

    info!("Server shut down cleanly.");
}
