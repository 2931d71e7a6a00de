use crate::errors::ServerError;
use crate::responses::json::json_error;
use astra::Response;
use log::error;

pub type ResultResp = Result<Response, ServerError>;

/// Convert a ServerError into a JSON error response
pub fn error_to_response(err: ServerError) -> Response {
    let status = err.status();
    match err {
        ServerError::NotFound => json_error(status, "Not found", None),
        ServerError::BadRequest(msg) => json_error(status, "Validation failed", Some(&msg)),
        ServerError::ExternalDataUnavailable(msg) => {
            json_error(status, "External data source unavailable", Some(&msg))
        }
        ServerError::DbError(msg) | ServerError::InvalidRecord(msg) => {
            error!("Request failed: {msg}");
            json_error(status, "Internal server error", Some(&msg))
        }
        ServerError::InternalError => json_error(status, "Internal server error", None),
    }
}
