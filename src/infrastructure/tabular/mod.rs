// ============================================================
// TABULAR INFRASTRUCTURE LAYER
// ============================================================
// Delimited-stream reading, cell classification and schema inference

mod schema_reader;
mod value_classifier;

pub use schema_reader::SchemaReader;
