//! Interactive prompts.
//!
//! Every prompt has a flag equivalent. When stdin is not a terminal, `--yes`
//! was passed, or the `interactive` feature is off, prompts resolve without
//! asking: inputs and selects take their default, confirmations take `true`
//! under `--yes` and their default otherwise.

use std::{fmt::Display, io::IsTerminal};

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, Copy)]
pub struct Prompter {
    interactive: bool,
    assume_yes: bool,
}

impl Prompter {
    pub fn new(assume_yes: bool) -> Self {
        let terminal = std::io::stdin().is_terminal() && std::io::stderr().is_terminal();
        Self {
            interactive: cfg!(feature = "interactive") && terminal && !assume_yes,
            assume_yes,
        }
    }

    /// Never asks.
    #[cfg(test)]
    pub fn non_interactive(assume_yes: bool) -> Self {
        Self {
            interactive: false,
            assume_yes,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Free text with a default, re-asked until `validate` accepts it.
    pub fn input<V>(&self, prompt: &str, default: &str, validate: V) -> CliResult<String>
    where
        V: Fn(&str) -> Result<(), String>,
    {
        if !self.interactive {
            validate(default).map_err(CliError::invalid_input)?;
            return Ok(default.to_string());
        }
        imp::input(prompt, Some(default), validate)
    }

    /// Free text without a default. Fails when nobody can answer.
    pub fn required_input<V>(&self, prompt: &str, flag: &str, validate: V) -> CliResult<String>
    where
        V: Fn(&str) -> Result<(), String>,
    {
        if !self.interactive {
            return Err(CliError::invalid_input(format!(
                "{prompt} is required; pass {flag}"
            )));
        }
        imp::input(prompt, None, validate)
    }

    /// Pick one of `items`, starting on `default`.
    pub fn select<T>(&self, prompt: &str, items: &[T], default: T) -> CliResult<T>
    where
        T: Display + Copy + PartialEq,
    {
        if !self.interactive {
            return Ok(default);
        }
        let start = items.iter().position(|i| *i == default).unwrap_or(0);
        let labels: Vec<String> = items.iter().map(ToString::to_string).collect();
        let index = imp::select(prompt, &labels, start)?;
        Ok(items.get(index).copied().unwrap_or(default))
    }

    pub fn confirm(&self, prompt: &str, default: bool) -> CliResult<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        if !self.interactive {
            return Ok(default);
        }
        imp::confirm(prompt, default)
    }

    /// Hidden input. Fails when nobody can answer.
    pub fn password(&self, prompt: &str, flag: &str) -> CliResult<String> {
        if !self.interactive {
            if cfg!(feature = "interactive") {
                return Err(CliError::invalid_input(format!(
                    "{prompt} is required; pass {flag}"
                )));
            }
            return Err(CliError::FeatureNotAvailable {
                feature: "interactive",
            });
        }
        imp::password(prompt)
    }
}

#[cfg(feature = "interactive")]
mod imp {
    use dialoguer::{Confirm, Input, Password, Select, theme::ColorfulTheme};

    use crate::error::{CliError, CliResult};

    fn map_err(e: dialoguer::Error) -> CliError {
        match e {
            dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                CliError::Cancelled
            }
            dialoguer::Error::IO(e) => CliError::IoError {
                message: "reading answer".into(),
                source: e,
            },
        }
    }

    pub(super) fn input<V>(prompt: &str, default: Option<&str>, validate: V) -> CliResult<String>
    where
        V: Fn(&str) -> Result<(), String>,
    {
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(prompt)
            .validate_with(|value: &String| validate(value.trim()));
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input
            .interact_text()
            .map(|value| value.trim().to_string())
            .map_err(map_err)
    }

    pub(super) fn select(prompt: &str, labels: &[String], start: usize) -> CliResult<usize> {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(labels)
            .default(start)
            .interact()
            .map_err(map_err)
    }

    pub(super) fn confirm(prompt: &str, default: bool) -> CliResult<bool> {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(map_err)
    }

    pub(super) fn password(prompt: &str) -> CliResult<String> {
        Password::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .interact()
            .map_err(map_err)
    }
}

#[cfg(not(feature = "interactive"))]
mod imp {
    use crate::error::{CliError, CliResult};

    const UNAVAILABLE: CliError = CliError::FeatureNotAvailable {
        feature: "interactive",
    };

    pub(super) fn input<V>(_: &str, _: Option<&str>, _: V) -> CliResult<String> {
        Err(UNAVAILABLE)
    }

    pub(super) fn select(_: &str, _: &[String], _: usize) -> CliResult<usize> {
        Err(UNAVAILABLE)
    }

    pub(super) fn confirm(_: &str, _: bool) -> CliResult<bool> {
        Err(UNAVAILABLE)
    }

    pub(super) fn password(_: &str) -> CliResult<String> {
        Err(UNAVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defai_core::domain::Tier;

    #[test]
    fn non_interactive_inputs_take_defaults() {
        let prompter = Prompter::non_interactive(false);
        assert_eq!(prompter.input("Author", "Ada", |_| Ok(())).unwrap(), "Ada");
        assert_eq!(
            prompter.select("Tier", &Tier::ALL, Tier::Silver).unwrap(),
            Tier::Silver
        );
        assert!(!prompter.confirm("Overwrite?", false).unwrap());
    }

    #[test]
    fn yes_accepts_confirmations() {
        let prompter = Prompter::non_interactive(true);
        assert!(prompter.confirm("Install dependencies now?", false).unwrap());
        assert!(!prompter.is_interactive());
    }

    #[test]
    fn invalid_default_is_rejected() {
        let prompter = Prompter::non_interactive(true);
        let err = prompter
            .input("Version", "1.0", |v| {
                if v.split('.').count() == 3 {
                    Ok(())
                } else {
                    Err("use MAJOR.MINOR.PATCH".into())
                }
            })
            .unwrap_err();
        assert!(err.to_string().contains("MAJOR.MINOR.PATCH"));
    }

    #[test]
    fn unanswerable_prompts_name_their_flag() {
        let prompter = Prompter::non_interactive(true);
        let err = prompter
            .required_input("Email", "--email", |_| Ok(()))
            .unwrap_err();
        assert!(err.to_string().contains("--email"));
        assert!(prompter.password("Password", "--password").is_err());
    }
}
