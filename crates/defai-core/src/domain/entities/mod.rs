pub mod common;
pub mod descriptor;
pub mod element;
pub mod manifest;
pub mod project_structure;
pub mod template;

pub use crate::domain::DomainError;
pub use descriptor::{ElementConfig, ProjectDescriptor};
pub use element::ElementDetails;
pub use manifest::{ElementManifest, Size};
pub use project_structure::ProjectStructure;
pub use template::{Template, TemplateId};
