//! DEFAI Element Core - domain and application layers.
//!
//! This crate holds everything the `defai-element` CLI knows about element
//! projects that does not touch the network or spawn processes: the manifest
//! and package descriptor schemas, project validation, and materializing
//! starter templates, arranged as ports and adapters.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          defai-cli (CLI)                │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (ProjectValidator, MaterializeService, │
//! │   TemplateService)                      │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │   (Filesystem, TemplateStore, Renderer) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      defai-adapters (Infrastructure)    │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (ElementManifest, ValidationResult,    │
//! │   Template, ProjectStructure)           │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use defai_core::application::{ProjectValidator, ValidationOptions};
//! # fn fs() -> Box<dyn defai_core::application::Filesystem> { unimplemented!() }
//!
//! let validator = ProjectValidator::new(fs());
//! let result = validator.validate_project(Path::new("./my-widget"), ValidationOptions::default());
//! for error in result.errors() {
//!     eprintln!("{error}");
//! }
//! ```

pub mod domain;

pub mod application;

pub mod error;

pub mod prelude {
    pub use crate::application::{
        ConflictPolicy, CreateRequest, MaterializeOutcome, MaterializeService, ProjectValidator,
        TemplateInfo, TemplateService, ValidationOptions,
        ports::{Filesystem, TemplateRenderer, TemplateStore},
    };
    pub use crate::domain::{
        Capability, Category, ElementDetails, ElementManifest, ProjectDescriptor,
        ProjectStructure, Template, TemplateId, TemplateMetadata, Tier, ValidationResult,
    };
    pub use crate::error::{CoreError, CoreResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
