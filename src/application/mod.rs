// Application layer - Use cases over the measurement pipeline
pub mod dashboard_service;
pub mod dataset_cache;
pub mod dataset_service;
pub mod evaluator;
pub mod measurement_source;
pub mod normalizer;
pub mod streaming_service;
