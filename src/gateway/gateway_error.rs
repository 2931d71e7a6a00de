use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Could not decode response from {url}: {msg}")]
    Decode { url: String, msg: String },

    #[error("Upstream reported an error: {0}")]
    Upstream(String),

    #[error("Fetch worker panicked")]
    WorkerPanicked,
}
