mod font;
mod png;

pub use png::PngSummary;

use crate::domain::CountryRecord;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("could not write summary image: {0}")]
    Io(#[from] std::io::Error),
}

/// Post-refresh hook that turns the full record set into a summary artifact.
pub trait SummaryRenderer: Send + Sync {
    fn render(
        &self,
        countries: &[CountryRecord],
        generated_at: DateTime<Utc>,
    ) -> Result<(), RenderError>;
}
