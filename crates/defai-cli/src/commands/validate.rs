//! `defai-element validate`.

use std::path::Path;

use serde_json::Value;
use tracing::{info, instrument};

use defai_core::{application::ValidationOptions, domain::MANIFEST_FILE};

use crate::{
    cli::{OutputFormat, ValidateArgs},
    commands::{Context, block_on, validate_project},
    error::{CliError, CliResult, IntoCli},
};

#[instrument(skip_all, fields(dir = %args.dir.display()))]
pub fn execute(args: ValidateArgs, ctx: &Context) -> CliResult<()> {
    let options = ValidationOptions {
        strict: args.strict,
        security_only: args.security_only,
    };

    if args.security_only {
        list_capabilities(&args.dir, ctx)?;
    }

    let result = validate_project(&args.dir, options);
    info!(valid = result.is_valid(), errors = result.errors().len(), "local validation");
    if ctx.output.format() == OutputFormat::Json {
        ctx.output.json(&result)?;
    }
    if !result.is_valid() {
        return Err(CliError::ValidationFailed {
            errors: result.into_errors(),
        });
    }

    if args.remote {
        validate_remotely(&args.dir, ctx)?;
    }

    let what = if args.security_only {
        "Permissions are valid"
    } else {
        "Element is valid"
    };
    ctx.output.success(what)?;
    Ok(())
}

/// Print the capabilities the manifest switches on.
fn list_capabilities(dir: &Path, ctx: &Context) -> CliResult<()> {
    let Some(manifest) = read_manifest(dir)? else {
        return Ok(());
    };
    let requested = requested(&manifest);
    if requested.is_empty() {
        ctx.output.info("No permissions requested")?;
        return Ok(());
    }
    ctx.output.header("Requested permissions:")?;
    for capability in requested {
        ctx.output.print(&format!("  • {capability}"))?;
    }
    Ok(())
}

fn requested(manifest: &Value) -> Vec<&str> {
    manifest
        .get("permissions")
        .and_then(Value::as_object)
        .map(|permissions| {
            permissions
                .iter()
                .filter(|(_, enabled)| enabled.as_bool() == Some(true))
                .map(|(capability, _)| capability.as_str())
                .collect()
        })
        .unwrap_or_default()
}

/// `None` when the manifest is absent or unreadable JSON; the validator
/// reports those cases itself.
fn read_manifest(dir: &Path) -> CliResult<Option<Value>> {
    let path = dir.join(MANIFEST_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&path)
        .with_cli_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&raw).ok())
}

fn validate_remotely(dir: &Path, ctx: &Context) -> CliResult<()> {
    let manifest = read_manifest(dir)?.ok_or_else(|| CliError::MissingManifest {
        dir: dir.to_path_buf(),
    })?;
    let client = ctx.marketplace()?;
    let spinner = ctx.output.spinner("Validating with the marketplace...");
    let remote = match block_on(client.validate(&manifest))? {
        Ok(remote) => remote,
        Err(e) => {
            spinner.clear();
            return Err(e.into());
        }
    };
    if !remote.valid || !remote.errors.is_empty() {
        spinner.clear();
        return Err(CliError::ValidationFailed {
            errors: remote.errors,
        });
    }
    spinner.succeed("Marketplace accepted the manifest");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_enabled_capabilities_are_listed() {
        let manifest = json!({
            "permissions": {"wallet": true, "network": false, "storage": true}
        });
        assert_eq!(requested(&manifest), vec!["wallet", "storage"]);
    }

    #[test]
    fn missing_permissions_request_nothing() {
        assert!(requested(&json!({"id": "x"})).is_empty());
        assert!(requested(&json!({"permissions": []})).is_empty());
    }

    #[test]
    fn unreadable_manifest_is_left_to_the_validator() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_manifest(dir.path()).unwrap().is_none());
        std::fs::write(dir.path().join(MANIFEST_FILE), "{ not json").unwrap();
        assert!(read_manifest(dir.path()).unwrap().is_none());
    }
}
