//! User configuration.
//!
//! [`CliConfig`] is loaded once at startup by a [`ConfigStore`] and passed
//! to every command. The core and adapter crates never see it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `DEFAI_API_KEY` / `DEFAI_API_URL` (including `.env`)
//! 3. The nearest `.defai-elementrc` / `.defai-elementrc.json` from the
//!    working directory upward, otherwise `~/.defai/config.json`
//! 4. Built-in defaults
//!
//! With `--config`, only that file is read. Writes always go to the user
//! file, never to a project rc file.

use std::{
    io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use defai_adapters::{builtin_templates::DEFAULT_TEMPLATE, marketplace::DEFAULT_API_URL};

use crate::error::{CliError, CliResult, IntoCli};

pub const CONFIG_DIR: &str = ".defai";
pub const CONFIG_FILE: &str = "config.json";

/// Project-local settings files, looked up from the working directory.
pub const RC_FILES: [&str; 2] = [".defai-elementrc", ".defai-elementrc.json"];

pub const ENV_API_KEY: &str = "DEFAI_API_KEY";
pub const ENV_API_URL: &str = "DEFAI_API_URL";

/// Keys `config --set` accepts.
pub const KNOWN_KEYS: [&str; 7] = [
    "apiKey",
    "apiUrl",
    "defaultTemplate",
    "analytics",
    "telemetry",
    "userEmail",
    "userId",
];

const BOOLEAN_KEYS: [&str; 2] = ["analytics", "telemetry"];

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CliConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub api_url: String,
    pub default_template: String,
    pub analytics: bool,
    pub telemetry: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Keys written by other tools are kept as they are.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            default_template: DEFAULT_TEMPLATE.to_string(),
            analytics: true,
            telemetry: true,
            user_email: None,
            user_id: None,
            extra: Map::new(),
        }
    }
}

impl CliConfig {
    pub fn is_logged_in(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Compiled-in defaults with the environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok());
        config
    }

    /// Apply environment overrides, looked up through `var`.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var(ENV_API_KEY).filter(|v| !v.is_empty()) {
            debug!("API key taken from {ENV_API_KEY}");
            self.api_key = Some(key);
        }
        if let Some(url) = var(ENV_API_URL).filter(|v| !v.is_empty()) {
            debug!(%url, "API URL taken from {ENV_API_URL}");
            self.api_url = url;
        }
    }

    /// This config as a flat JSON object, as it would be written.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// The user config file on disk, plus a project rc file when one applies.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    project_rc: Option<PathBuf>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            project_rc: None,
        }
    }

    /// `override_path` alone, or `~/.defai/config.json` with the nearest
    /// project rc file above the working directory.
    pub fn locate(override_path: Option<&Path>) -> CliResult<Self> {
        if let Some(path) = override_path {
            return Ok(Self::new(path));
        }
        let dirs = directories::BaseDirs::new()
            .ok_or_else(|| CliError::config("cannot determine the home directory"))?;
        let store = Self::new(dirs.home_dir().join(CONFIG_DIR).join(CONFIG_FILE));
        Ok(match std::env::current_dir() {
            Ok(cwd) => store.with_project_rc(&cwd),
            Err(_) => store,
        })
    }

    /// Read settings from the nearest rc file at or above `start`, if any.
    pub fn with_project_rc(mut self, start: &Path) -> Self {
        self.project_rc = start.ancestors().find_map(|dir| {
            RC_FILES
                .iter()
                .map(|name| dir.join(name))
                .find(|candidate| candidate.is_file())
        });
        if let Some(rc) = &self.project_rc {
            debug!(path = %rc.display(), "using project rc file");
        }
        self
    }

    /// The user file that `save`, `set` and `reset` change.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file settings are read from.
    pub fn source(&self) -> &Path {
        self.project_rc.as_deref().unwrap_or(&self.path)
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Defaults, overlaid with the file, overlaid with the environment.
    /// Nothing is created.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> CliResult<CliConfig> {
        let mut config = self.load_file()?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Defaults overlaid with the source file only.
    pub fn load_file(&self) -> CliResult<CliConfig> {
        let source = self.source();
        let raw = read_object(source)?;
        serde_json::from_value(Value::Object(raw))
            .with_cli_context(|| format!("invalid settings in {}", source.display()))
    }

    /// Merge `patch` into the file. `null` values remove their key.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn save(&self, patch: Map<String, Value>) -> CliResult<()> {
        let mut current = read_object(&self.path)?;
        for (key, value) in patch {
            if value.is_null() {
                current.remove(&key);
            } else {
                current.insert(key, value);
            }
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_cli_context(|| format!("creating {}", parent.display()))?;
        }
        let mut body = serde_json::to_string_pretty(&Value::Object(current))
            .with_cli_context(|| "serialising config")?;
        body.push('\n');
        std::fs::write(&self.path, body)
            .with_cli_context(|| format!("writing {}", self.path.display()))?;
        info!("config saved");
        Ok(())
    }

    /// Effective value of `key`, or `None` when it is not set anywhere.
    pub fn get(&self, key: &str) -> CliResult<Option<Value>> {
        Ok(self.load()?.to_map().remove(key))
    }

    /// Set one known key from its command-line spelling.
    pub fn set(&self, key: &str, raw: &str) -> CliResult<Value> {
        let value = coerce(key, raw)?;
        let mut patch = Map::new();
        patch.insert(key.to_string(), value.clone());
        self.save(patch)?;
        Ok(value)
    }

    /// Delete the file; defaults apply from then on.
    pub fn reset(&self) -> CliResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "config reset");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_cli_context(|| format!("removing {}", self.path.display())),
        }
    }
}

/// File contents as a JSON object; an absent file is empty.
fn read_object(path: &Path) -> CliResult<Map<String, Value>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => {
            return Err(e).with_cli_context(|| format!("reading {}", path.display()));
        }
    };
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(&raw)
        .with_cli_context(|| format!("{} is not valid JSON", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => Err(CliError::config(format!(
            "{} must contain a JSON object",
            path.display()
        ))),
    }
}

/// Typed value for `key`; an empty value unsets optional keys.
fn coerce(key: &str, raw: &str) -> CliResult<Value> {
    if !KNOWN_KEYS.contains(&key) {
        return Err(CliError::config(format!(
            "unknown config key '{key}' (known keys: {})",
            KNOWN_KEYS.join(", ")
        )));
    }

    if BOOLEAN_KEYS.contains(&key) {
        return match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(CliError::invalid_input(format!(
                "'{key}' must be true or false, got '{raw}'"
            ))),
        };
    }

    match key {
        "apiUrl" if !(raw.starts_with("http://") || raw.starts_with("https://")) => Err(
            CliError::invalid_input(format!("'apiUrl' must start with http:// or https://, got '{raw}'")),
        ),
        "apiUrl" | "defaultTemplate" if raw.is_empty() => {
            Err(CliError::invalid_input(format!("'{key}' cannot be empty")))
        }
        _ if raw.is_empty() => Ok(Value::Null),
        _ => Ok(Value::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join(CONFIG_DIR).join(CONFIG_FILE));
        (dir, store)
    }

    #[test]
    fn defaults_point_at_the_marketplace() {
        let config = CliConfig::default();
        assert_eq!(config.api_url, "https://api.defai.com");
        assert_eq!(config.default_template, "react");
        assert!(config.analytics);
        assert!(config.telemetry);
        assert!(!config.is_logged_in());
    }

    #[test]
    fn missing_file_loads_defaults_without_creating_it() {
        let (_dir, store) = store();
        assert_eq!(store.load_file().unwrap(), CliConfig::default());
        assert!(!store.exists());
    }

    #[test]
    fn file_values_merge_over_defaults() {
        let (_dir, store) = store();
        store
            .save(json!({"defaultTemplate": "vue", "custom": 1}).as_object().unwrap().clone())
            .unwrap();

        let config = store.load_file().unwrap();
        assert_eq!(config.default_template, "vue");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.extra["custom"], 1);
    }

    #[test]
    fn save_merges_and_null_removes() {
        let (_dir, store) = store();
        store
            .save(json!({"apiKey": "k", "userEmail": "a@b.co"}).as_object().unwrap().clone())
            .unwrap();
        store
            .save(json!({"apiKey": null, "userId": "7"}).as_object().unwrap().clone())
            .unwrap();

        let raw: Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw, json!({"userEmail": "a@b.co", "userId": "7"}));
    }

    #[test]
    fn project_rc_is_read_but_never_written() {
        let (dir, store) = store();
        let project = dir.path().join("widgets/ticker");
        std::fs::create_dir_all(&project).unwrap();
        let rc_path = dir.path().join("widgets/.defai-elementrc");
        std::fs::write(&rc_path, r#"{"defaultTemplate": "chart"}"#).unwrap();

        let store = store.with_project_rc(&project);
        assert!(store.source().ends_with("widgets/.defai-elementrc"));
        assert_eq!(store.load_file().unwrap().default_template, "chart");

        store.set("analytics", "off").unwrap();
        assert!(!std::fs::read_to_string(&rc_path).unwrap().contains("analytics"));
        assert!(store.path().is_file());
    }

    #[test]
    fn without_rc_the_user_file_is_the_source() {
        let (dir, store) = store();
        let store = store.with_project_rc(dir.path());
        assert_eq!(store.source(), store.path());
    }

    #[test]
    fn malformed_file_is_a_configuration_error() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ nope").unwrap();
        assert!(matches!(store.load_file(), Err(CliError::ConfigError { .. })));

        std::fs::write(store.path(), "[1, 2]").unwrap();
        assert!(matches!(store.load_file(), Err(CliError::ConfigError { .. })));
    }

    #[test]
    fn set_coerces_booleans() {
        let (_dir, store) = store();
        assert_eq!(store.set("analytics", "false").unwrap(), Value::Bool(false));
        assert!(!store.load_file().unwrap().analytics);
        assert!(store.set("telemetry", "maybe").is_err());
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_urls() {
        let (_dir, store) = store();
        assert!(matches!(store.set("colour", "red"), Err(CliError::ConfigError { .. })));
        assert!(matches!(
            store.set("apiUrl", "api.defai.com"),
            Err(CliError::InvalidInput { .. })
        ));
        assert!(!store.exists());
    }

    #[test]
    fn empty_value_unsets_optional_key() {
        let (_dir, store) = store();
        store.set("apiKey", "secret").unwrap();
        store.set("apiKey", "").unwrap();
        assert_eq!(store.load_file().unwrap().api_key, None);
    }

    #[test]
    fn reset_removes_the_file_and_tolerates_absence() {
        let (_dir, store) = store();
        store.set("defaultTemplate", "chart").unwrap();
        store.reset().unwrap();
        assert!(!store.exists());
        store.reset().unwrap();
    }

    #[test]
    fn environment_overrides_the_file() {
        let mut config = CliConfig::default();
        config.apply_env(|name| match name {
            ENV_API_KEY => Some("from-env".into()),
            ENV_API_URL => Some("http://localhost:4000".into()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.api_url, "http://localhost:4000");
    }

    #[test]
    fn map_skips_unset_optionals() {
        let map = CliConfig::default().to_map();
        assert!(!map.contains_key("apiKey"));
        assert_eq!(map["defaultTemplate"], "react");
    }
}
