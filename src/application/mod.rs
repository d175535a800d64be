pub mod use_cases;

pub use use_cases::data_sources::{DataSourceUseCase, UploadRequest};
pub use use_cases::narrative::NarrativeGenerator;
pub use use_cases::reports::ReportUseCase;
pub use use_cases::schema_inference::SchemaInferenceUseCase;
