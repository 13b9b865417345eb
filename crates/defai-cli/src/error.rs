//! Error handling for the `defai-element` CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Proper error chaining
//! - Exit code mapping

use std::path::PathBuf;
use std::{error::Error, fmt};

use owo_colors::OwoColorize;
use thiserror::Error;

use defai_adapters::{
    ArchiveError, BundlerError, DevServerError, InstallError, MarketplaceError,
};
use defai_core::{domain::validation::NAME_MAX_LEN, error::CoreError};

pub use defai_core::error::ErrorCategory as CoreCategory;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input caught before any work started.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Invalid element name '{name}'")]
    InvalidElementName { name: String },

    /// One or more validation errors, reported together.
    #[error("Validation failed with {} error(s)", errors.len())]
    ValidationFailed { errors: Vec<String> },

    // ── Lower layers ───────────────────────────────────────────────────────
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Bundler(#[from] BundlerError),

    #[error(transparent)]
    DevServer(#[from] DevServerError),

    #[error(transparent)]
    Marketplace(#[from] MarketplaceError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Install(#[from] InstallError),

    // ── Config errors ──────────────────────────────────────────────────────
    /// The config file could not be read, parsed or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── Project state ──────────────────────────────────────────────────────
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("No manifest.json found in {}", dir.display())]
    MissingManifest { dir: PathBuf },

    #[error("Build output not found at {}", dir.display())]
    MissingBuild { dir: PathBuf },

    // ── System errors ──────────────────────────────────────────────────────
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The user declined a confirmation or interrupted a prompt.
    #[error("Operation cancelled")]
    Cancelled,

    /// Interactive prompting without the `interactive` feature.
    #[error("Feature not available: {feature}")]
    FeatureNotAvailable { feature: &'static str },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            source: None,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: None,
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message, .. } => vec![
                format!("Check your input: {}", message),
                "Use --help for usage information".into(),
            ],

            Self::InvalidElementName { .. } => vec![
                format!("Use 3-{NAME_MAX_LEN} characters: lowercase letters, numbers and hyphens"),
                "Start with a letter, end with a letter or number".into(),
                "No consecutive hyphens".into(),
                "Examples: price-ticker, whale-watch, my-widget-2".into(),
            ],

            Self::ValidationFailed { errors } => {
                let mut out: Vec<String> = errors.iter().map(|e| format!("• {e}")).collect();
                out.push("Fix the issues above, then run: defai-element validate".into());
                out
            }

            Self::Core(e) => e.suggestions(),
            Self::Bundler(e) => e.suggestions(),
            Self::DevServer(e) => e.suggestions(),
            Self::Marketplace(e) => e.suggestions(),
            Self::Archive(e) => e.suggestions(),
            Self::Install(e) => e.suggestions(),

            Self::ConfigError { .. } => vec![
                "Inspect it with: defai-element config --list".into(),
                "Start over with: defai-element config --reset".into(),
            ],

            Self::NotLoggedIn => vec![
                "Run: defai-element login".into(),
                "Or set DEFAI_API_KEY in the environment".into(),
            ],

            Self::MissingManifest { .. } => vec![
                "Run this command from an element project directory".into(),
                "Or pass the project with --dir <path>".into(),
                "Create a project with: defai-element create <name>".into(),
            ],

            Self::MissingBuild { .. } => vec!["Run: defai-element build".into()],

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {}", message),
                "Check file permissions".into(),
                "Ensure the parent directory exists".into(),
            ],

            Self::Cancelled => vec!["No changes were made".into()],

            Self::FeatureNotAvailable { feature } => vec![
                format!("The '{}' feature is not available in this build", feature),
                "Pass the answers as flags, or --yes to accept defaults".into(),
                format!("Or reinstall with: cargo install defai-cli --features {feature}"),
            ],
        }
    }

    /// Get the error category for styling and logging.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. }
            | Self::InvalidElementName { .. }
            | Self::ValidationFailed { .. }
            | Self::MissingManifest { .. }
            | Self::MissingBuild { .. }
            | Self::Cancelled => ErrorCategory::UserError,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::Bundler(e) if e.is_user_error() => ErrorCategory::UserError,
            Self::Bundler(_) | Self::Install(_) => ErrorCategory::External,
            Self::DevServer(DevServerError::Bundler(e)) if e.is_user_error() => {
                ErrorCategory::UserError
            }
            Self::DevServer(_) => ErrorCategory::External,
            Self::Marketplace(e) if e.is_unauthorized() => ErrorCategory::Configuration,
            Self::Marketplace(_) => ErrorCategory::External,
            Self::Archive(ArchiveError::MissingOutput(_)) => ErrorCategory::NotFound,
            Self::Archive(_) | Self::IoError { .. } => ErrorCategory::Internal,
            Self::ConfigError { .. } | Self::NotLoggedIn | Self::FeatureNotAvailable { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    /// Exit code to pass to the OS: 0 when the user cancelled, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Cancelled => 0,
            _ => 1,
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        if let Self::Cancelled = self {
            return format!("{} {}\n", "\u{26a0}".yellow().bold(), "Operation cancelled".yellow());
        }

        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "✗".red().bold(),
            "Error:".red().bold()
        ));
        output.push_str(&format!("  {}\n", self.to_string().red()));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!(
                    "\n  {} {}\n",
                    "→".dimmed(),
                    err.to_string().dimmed()
                ));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {}\n", suggestion));
            }
        }

        if !verbose {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(),
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`], no ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        if let Self::Cancelled = self {
            return "Operation cancelled\n".into();
        }

        let mut out = String::new();
        out.push_str(&format!("\nError: {}\n", self));

        if verbose {
            let mut src = std::error::Error::source(self);
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::Configuration => tracing::error!("{}", self),
            ErrorCategory::External => tracing::error!("External failure: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User input error (validation, invalid arguments).
    UserError,
    /// Resource not found.
    NotFound,
    /// Configuration or login state.
    Configuration,
    /// A tool or service outside the process (npm, webpack, the API).
    External,
    /// Internal/system error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UserError => "user",
            Self::NotFound => "not-found",
            Self::Configuration => "configuration",
            Self::External => "external",
            Self::Internal => "internal",
        })
    }
}

// ── IntoCli trait ─────────────────────────────────────────────────────────────

/// Converts foreign error types into [`CliError`] at call-sites with a
/// descriptive context message.
///
/// Concrete impls only; a blanket impl would overlap with them.
pub trait IntoCli<T> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

impl<T> IntoCli<T> for Result<T, serde_json::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::ConfigError {
            message: format!("{}: {e}", f().into()),
            source: Some(Box::new(e)),
        })
    }
}

impl<T> IntoCli<T> for Result<T, CoreError> {
    /// Core errors already carry their context; the message is dropped.
    fn with_cli_context<F, S>(self, _f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(CliError::Core)
    }
}
