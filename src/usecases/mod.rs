//! Application use cases. Orchestrate domain logic via ports.

pub mod extraction_service;
pub mod split_service;

pub use extraction_service::{DEFAULT_MAX_IMAGE_BYTES, ExtractionService};
pub use split_service::SplitService;
