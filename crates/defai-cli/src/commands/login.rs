//! `defai-element login` and `defai-element logout`.

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::{
    cli::LoginArgs,
    commands::{Context, block_on},
    error::{CliError, CliResult},
};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Credential keys written by login and cleared by logout.
const CREDENTIAL_KEYS: [&str; 3] = ["apiKey", "userEmail", "userId"];

#[instrument(skip_all)]
pub fn execute(args: LoginArgs, ctx: &Context) -> CliResult<()> {
    if ctx.config.is_logged_in() {
        let who = ctx.config.user_email.as_deref().unwrap_or("an account");
        if !ctx
            .prompter
            .confirm(&format!("Already logged in as {who}. Log in again?"), false)?
        {
            return Err(CliError::Cancelled);
        }
    }

    if let Some(key) = args.key {
        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(CliError::invalid_input("the API key cannot be empty"));
        }
        ctx.store
            .save(credentials(Value::String(key), Value::Null, Value::Null))?;
        info!("api key stored");
        ctx.output.success("API key saved")?;
        return Ok(());
    }

    let email = match args.email {
        Some(email) => {
            valid_email(&email).map_err(CliError::invalid_input)?;
            email
        }
        None => ctx
            .prompter
            .required_input("Email", "--email", valid_email)?,
    };
    let password = match args.password {
        Some(password) => password,
        None => ctx.prompter.password("Password", "--password")?,
    };

    let client = ctx.marketplace()?;
    let spinner = ctx.output.spinner("Logging in...");
    let response = match block_on(client.login(&email, &password))? {
        Ok(response) => response,
        Err(e) => {
            spinner.clear();
            return Err(e.into());
        }
    };
    spinner.succeed("Authenticated");

    ctx.store.save(credentials(
        Value::String(response.token),
        Value::String(response.user.email.clone()),
        Value::String(response.user.id),
    ))?;
    info!(email = %response.user.email, "logged in");
    ctx.output
        .success(&format!("Logged in as {}", response.user.email))?;
    Ok(())
}

#[instrument(skip_all)]
pub fn logout(ctx: &Context) -> CliResult<()> {
    if !ctx.config.is_logged_in() {
        ctx.output.info("You are not logged in")?;
        return Ok(());
    }
    if !ctx.prompter.confirm("Are you sure you want to log out?", true)? {
        return Err(CliError::Cancelled);
    }
    ctx.store
        .save(credentials(Value::Null, Value::Null, Value::Null))?;
    info!("logged out");
    ctx.output.success("Logged out")?;
    Ok(())
}

fn credentials(api_key: Value, email: Value, user_id: Value) -> Map<String, Value> {
    CREDENTIAL_KEYS
        .into_iter()
        .map(String::from)
        .zip([api_key, email, user_id])
        .collect()
}

fn valid_email(value: &str) -> Result<(), String> {
    let email = Regex::new(EMAIL_PATTERN).map_err(|e| e.to_string())?;
    if email.is_match(value.trim()) {
        Ok(())
    } else {
        Err(format!("'{value}' is not a valid email address"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_is_checked() {
        assert!(valid_email("ada@example.com").is_ok());
        assert!(valid_email("ada@example").is_err());
        assert!(valid_email("ada example@x.io").is_err());
        assert!(valid_email("@example.com").is_err());
    }

    #[test]
    fn logout_patch_nulls_every_credential() {
        let patch = credentials(Value::Null, Value::Null, Value::Null);
        assert_eq!(patch.len(), 3);
        assert!(patch.values().all(Value::is_null));
        assert!(CREDENTIAL_KEYS.iter().all(|k| patch.contains_key(*k)));
    }

    #[test]
    fn login_patch_names_keys_in_camel_case() {
        let patch = credentials("tok".into(), "ada@example.com".into(), "u1".into());
        assert_eq!(patch["apiKey"], "tok");
        assert_eq!(patch["userEmail"], "ada@example.com");
        assert_eq!(patch["userId"], "u1");
    }
}
