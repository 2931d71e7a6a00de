// config.rs
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Process settings. Read from an optional `settings.toml`, then overridden
/// by `APP_*` environment variables (e.g. `APP_PORT=8080`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_workers: usize,
    pub database_path: String,
    pub countries_url: String,
    pub rates_url: String,
    pub http_timeout_secs: u64,
    pub summary_image_path: PathBuf,
    /// When set, every refresh draws GDP multipliers from a generator seeded
    /// with this value instead of OS entropy.
    pub gdp_seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_workers: 8,
            database_path: "countries.sqlite3".to_string(),
            countries_url:
                "https://restcountries.com/v2/all?fields=name,capital,region,population,flag,currencies"
                    .to_string(),
            rates_url: "https://open.er-api.com/v6/latest/USD".to_string(),
            http_timeout_secs: 30,
            summary_image_path: PathBuf::from("cache/summary.png"),
            gdp_seed: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ::config::ConfigError> {
        ::config::Config::builder()
            .add_source(::config::File::with_name("settings").required(false))
            .add_source(::config::Environment::with_prefix("APP").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
