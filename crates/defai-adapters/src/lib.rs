//! Infrastructure adapters for defai-element.
//!
//! This crate implements the ports defined in `defai-core::application::ports`
//! and everything else that touches the outside world: webpack and npm
//! subprocesses, the development preview server, the marketplace API and
//! the bundle archive.

pub mod archive;
pub mod builtin_templates;
pub mod bundler;
pub mod devserver;
pub mod filesystem;
pub mod installer;
pub mod marketplace;
pub mod renderer;
pub mod template_loader;
pub mod template_store;

// Re-export commonly used adapters
pub use archive::{ArchiveError, BundleArchive, create_bundle};
pub use bundler::{BundlerError, BundlerOptions, Mode, Webpack};
pub use devserver::{DevServerError, DevSession};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use installer::{InstallError, PackageManager, TestOptions};
pub use marketplace::{MarketplaceClient, MarketplaceError};
pub use renderer::ElementRenderer;
pub use template_store::InMemoryStore;
