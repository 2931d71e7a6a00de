pub mod errors;
pub mod json;
pub mod png;

pub use errors::{error_to_response, ResultResp};

pub use json::{json_error, json_response, no_content};
pub use png::png_response;
