pub mod country;
pub mod reconcile;

pub use country::{CountryFilter, CountryRecord, NewCountry, SortOrder};
pub use reconcile::reconcile;
