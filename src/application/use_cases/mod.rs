pub mod data_sources;
pub mod narrative;
pub mod reports;
pub mod schema_inference;
