// responses/png.rs
use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};

/// Return PNG bytes as an inline image
pub fn png_response(buffer: Vec<u8>) -> ResultResp {
    let resp = ResponseBuilder::new()
        .status(200)
        .header("Content-Type", mime::IMAGE_PNG.as_ref())
        .header("Cache-Control", "no-cache")
        .body(Body::from(buffer))
        .map_err(|_| ServerError::InternalError)?;

    Ok(resp)
}
