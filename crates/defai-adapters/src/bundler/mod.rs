//! Bundler adapter: generates a webpack configuration for an element
//! project and drives webpack as a child process.
//!
//! The tool never bundles anything itself. [`Webpack::build`] runs one
//! production build and parses its stats into a [`BuildReport`];
//! [`Webpack::serve`] starts the development server used by `dev`.

mod config;
mod entry;
mod error;
mod options;
mod report;
mod webpack;

pub use config::{JsExpr, PERFORMANCE_BUDGET, PROXIED_ROUTES, Toggle, WebpackConfig};
pub use entry::{ENTRY_CANDIDATES, detect_entry};
pub use error::BundlerError;
pub use options::{
    BundlerOptions, CONFIG_DIR, CONFIG_FILE, DEFAULT_HOST, DEFAULT_OUTPUT_DIR, DEFAULT_PORT, Mode,
};
pub use report::{
    Asset, BuildReport, MAX_BUNDLE_BYTES, MAX_BUNDLE_MB, dir_size, format_size,
    validate_bundle_size,
};
pub use webpack::{NPX, Webpack};
