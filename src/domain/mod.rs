pub mod data_source;
pub mod error;
pub mod narrative;
pub mod report;

// Tabular ingestion module
pub mod tabular;
