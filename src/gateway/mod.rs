mod client;
mod gateway_error;
mod models;

pub use client::HttpGateway;
pub use gateway_error::GatewayError;
pub use models::{ExternalData, RateTable, RatesResponse, RawCountry, RawCurrency};

/// Anything that can hand the refresh pipeline both upstream datasets.
///
/// Implementations must return both or neither; a partial fetch is an error.
pub trait ExternalDataSource: Send + Sync {
    fn fetch(&self) -> Result<ExternalData, GatewayError>;
}
