// errors.rs
use thiserror::Error;

/// Errors originating from either the server logic
/// (routing, missing resources, etc.) or downstream layers (DB, upstream APIs).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Database Error: {0}")]
    DbError(String),

    /// Either upstream fetch failed; the sub-cause is only carried as text.
    #[error("External data source unavailable: {0}")]
    ExternalDataUnavailable(String),

    /// A raw entry could not be turned into a storable record.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Internal Server Error")]
    InternalError,
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::ExternalDataUnavailable(_) => 503,
            ServerError::DbError(_) | ServerError::InvalidRecord(_) | ServerError::InternalError => {
                500
            }
        }
    }
}
