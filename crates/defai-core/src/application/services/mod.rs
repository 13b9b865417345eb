//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "validate a project" or "create an element".

pub mod materialize_service;
pub mod project_validator;
pub mod template_service;

pub use materialize_service::{ConflictPolicy, CreateRequest, MaterializeOutcome, MaterializeService};
pub use project_validator::{ProjectValidator, ValidationOptions};
pub use template_service::{TemplateInfo, TemplateService};
