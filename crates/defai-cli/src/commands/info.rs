//! `defai-element info`: environment report for bug reports.

use serde::Serialize;
use tracing::instrument;

use defai_adapters::installer::node_version;

use crate::{
    cli::OutputFormat,
    commands::{Context, block_on},
    error::CliResult,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Environment {
    version: &'static str,
    os: &'static str,
    arch: &'static str,
    node: Option<String>,
    config_path: String,
    api_url: String,
    logged_in: bool,
    user_email: Option<String>,
}

#[instrument(skip_all)]
pub fn execute(ctx: &Context) -> CliResult<()> {
    let env = Environment {
        version: env!("CARGO_PKG_VERSION"),
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        node: block_on(node_version())?,
        config_path: ctx.store.path().display().to_string(),
        api_url: ctx.config.api_url.clone(),
        logged_in: ctx.config.is_logged_in(),
        user_email: ctx.config.user_email.clone(),
    };

    if ctx.output.format() == OutputFormat::Json {
        ctx.output.json(&env)?;
        return Ok(());
    }

    let login = match (&env.user_email, env.logged_in) {
        (Some(email), true) => format!("yes ({email})"),
        (None, true) => "yes".into(),
        (_, false) => "no".into(),
    };
    ctx.output.header("DEFAI Element CLI")?;
    ctx.output.field("Version", env.version, 10)?;
    ctx.output
        .field("Platform", &format!("{} ({})", env.os, env.arch), 10)?;
    ctx.output
        .field("Node.js", env.node.as_deref().unwrap_or("not found"), 10)?;
    ctx.output.field("Config", &env.config_path, 10)?;
    ctx.output.field("API URL", &env.api_url, 10)?;
    ctx.output.field("Logged in", &login, 10)?;
    Ok(())
}
