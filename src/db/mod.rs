pub mod connection;
pub mod countries;

pub use connection::{init_db, Database};
pub use countries::CountryStore;
