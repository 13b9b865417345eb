//! Command handlers, one module per verb.
//!
//! Handlers translate arguments into calls on `defai-core` services and
//! `defai-adapters`, and report through the [`OutputManager`]. Each async
//! handler drives its work through exactly one [`block_on`].

use std::{
    future::Future,
    path::{Path, PathBuf},
};

use tracing::debug;

use defai_adapters::{InMemoryStore, LocalFilesystem, MarketplaceClient};
use defai_core::{
    application::{ProjectValidator, ValidationOptions},
    domain::{MANIFEST_FILE, ValidationResult},
};

use crate::{
    cli::GlobalArgs,
    config::{CliConfig, ConfigStore},
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
    prompt::Prompter,
};

pub mod build;
pub mod completions;
pub mod config;
pub mod create;
pub mod dev;
pub mod docs;
pub mod info;
pub mod list;
pub mod login;
pub mod publish;
pub mod stats;
pub mod templates;
pub mod test;
pub mod validate;

/// Everything a handler may need, built once in `main`.
pub struct Context {
    pub store: ConfigStore,
    pub config: CliConfig,
    pub output: OutputManager,
    pub prompter: Prompter,
}

impl Context {
    pub fn new(global: GlobalArgs, store: ConfigStore, config: CliConfig) -> Self {
        Self {
            output: OutputManager::new(&global),
            prompter: Prompter::new(global.yes),
            store,
            config,
        }
    }

    /// Client for the configured API, authenticated when logged in.
    pub fn marketplace(&self) -> CliResult<MarketplaceClient> {
        Ok(MarketplaceClient::new(
            &self.config.api_url,
            self.config.api_key.clone(),
        )?)
    }

    /// Like [`Self::marketplace`], but only for a logged-in user.
    pub fn authenticated_marketplace(&self) -> CliResult<MarketplaceClient> {
        if !self.config.is_logged_in() {
            return Err(CliError::NotLoggedIn);
        }
        self.marketplace()
    }
}

/// Run one future to completion on a current-thread runtime.
pub fn block_on<F: Future>(future: F) -> CliResult<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .with_cli_context(|| "starting the async runtime")?;
    Ok(runtime.block_on(future))
}

/// Built-in templates plus any under `$DEFAI_TEMPLATES_DIR`.
pub fn template_store() -> CliResult<InMemoryStore> {
    let store = InMemoryStore::with_builtin()?;
    debug!(templates = store.len(), "template store ready");
    Ok(store)
}

/// The project directory, which must hold a manifest.
pub fn project_dir(dir: &Path) -> CliResult<PathBuf> {
    if !dir.join(MANIFEST_FILE).is_file() {
        return Err(CliError::MissingManifest {
            dir: dir.to_path_buf(),
        });
    }
    Ok(dir.to_path_buf())
}

pub fn validate_project(dir: &Path, options: ValidationOptions) -> ValidationResult {
    ProjectValidator::new(Box::new(LocalFilesystem::new())).validate_project(dir, options)
}

/// Fail with every error when the project is not valid.
pub fn require_valid(dir: &Path, options: ValidationOptions) -> CliResult<()> {
    let result = validate_project(dir, options);
    if result.is_valid() {
        return Ok(());
    }
    Err(CliError::ValidationFailed {
        errors: result.into_errors(),
    })
}
