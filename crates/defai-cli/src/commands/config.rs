//! `defai-element config`: read and write user settings.

use serde_json::{Map, Value};
use tracing::instrument;

use crate::{
    cli::{ConfigArgs, OutputFormat},
    commands::Context,
    error::{CliError, CliResult},
};

/// Exactly one action per invocation; clap enforces the group.
#[instrument(skip_all)]
pub fn execute(args: ConfigArgs, ctx: &Context) -> CliResult<()> {
    if let Some(key) = args.get {
        return get(&key, ctx);
    }
    if let Some((key, raw)) = args.set {
        let value = ctx.store.set(&key, &raw)?;
        ctx.output
            .success(&format!("Set {key} = {}", display(&key, &value)))?;
        return Ok(());
    }
    if args.list {
        return list(ctx);
    }
    if args.reset {
        if !ctx
            .prompter
            .confirm("Reset all configuration to defaults?", false)?
        {
            return Err(CliError::Cancelled);
        }
        ctx.store.reset()?;
        ctx.output.success("Configuration reset to defaults")?;
        return Ok(());
    }
    ctx.output.data(&ctx.store.path().display().to_string())?;
    Ok(())
}

fn get(key: &str, ctx: &Context) -> CliResult<()> {
    match ctx.store.get(key)? {
        Some(value) => ctx.output.data(&raw(&value))?,
        None => ctx.output.warning(&format!("{key} is not set"))?,
    }
    Ok(())
}

fn list(ctx: &Context) -> CliResult<()> {
    let settings = ctx.config.to_map();
    if ctx.output.format() == OutputFormat::Json {
        ctx.output.json(&masked(settings))?;
        return Ok(());
    }

    ctx.output.header("Current configuration:")?;
    let width = settings.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in &settings {
        ctx.output.field(key, &display(key, value), width)?;
    }
    ctx.output.print("")?;
    let source = if ctx.store.exists() {
        ctx.store.path().display().to_string()
    } else {
        format!("{} (not created yet)", ctx.store.path().display())
    };
    ctx.output.hint(&format!("  File: {source}"))?;
    if ctx.store.source() != ctx.store.path() {
        ctx.output
            .hint(&format!("  Read from: {}", ctx.store.source().display()))?;
    }
    Ok(())
}

/// Strings without quotes, everything else as JSON.
fn raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Like [`raw`], with the API key shortened.
fn display(key: &str, value: &Value) -> String {
    match value {
        Value::String(secret) if key == "apiKey" => mask(secret),
        other => raw(other),
    }
}

fn masked(mut settings: Map<String, Value>) -> Map<String, Value> {
    if let Some(Value::String(secret)) = settings.get_mut("apiKey") {
        *secret = mask(secret);
    }
    settings
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".into()
    } else {
        format!("{visible}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_keys_are_masked() {
        assert_eq!(mask("sk_live_0123456789"), "sk_l****");
        assert_eq!(mask("short"), "****");
        assert_eq!(display("apiKey", &json!("sk_live_0123456789")), "sk_l****");
        assert_eq!(display("userEmail", &json!("ada@example.com")), "ada@example.com");
    }

    #[test]
    fn raw_values_drop_string_quotes() {
        assert_eq!(raw(&json!("react")), "react");
        assert_eq!(raw(&json!(false)), "false");
    }

    #[test]
    fn masked_map_keeps_other_keys() {
        let mut settings = Map::new();
        settings.insert("apiKey".into(), json!("sk_live_0123456789"));
        settings.insert("apiUrl".into(), json!("https://api.defai.com"));
        let settings = masked(settings);
        assert_eq!(settings["apiKey"], "sk_l****");
        assert_eq!(settings["apiUrl"], "https://api.defai.com");
    }
}
