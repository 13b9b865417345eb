//! # defai-element
//!
//! Create, preview, build and publish DEFAI marketplace elements.
//!
//! ## Startup sequence
//!
//! 1. Load `.env`, then parse arguments.
//! 2. Initialise the tracing subscriber.
//! 3. Locate and load the user configuration.
//! 4. Build the command [`Context`].
//! 5. Dispatch to the command handler.
//! 6. Translate any [`CliError`] into a message and an exit code.
//!
//! ## Exit codes
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! |  0   | Success, `--help`, `--version`, or cancelled     |
//! |  1   | Any failure, including bad arguments             |

use std::{io::IsTerminal, process::ExitCode};

use clap::Parser;
use tracing::{debug, info, instrument, warn};

use crate::{
    cli::{Cli, Commands},
    commands::Context,
    config::{CliConfig, ConfigStore},
    error::{CliError, CliResult},
    logging::init_logging,
};

mod browser;
mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;
mod prompt;

fn main() -> ExitCode {
    // Absent .env files are fine.
    let _ = dotenvy::dotenv();

    // ── 1. Parse arguments ────────────────────────────────────────────────
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and succeed; everything else is
            // a usage error.
            let failed = e.use_stderr();
            if let Err(print_err) = e.print() {
                eprintln!("{print_err}");
            }
            return if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // ── 2. Initialise tracing ─────────────────────────────────────────────
    if let Err(e) = init_logging(&cli.global) {
        eprintln!("Failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    debug!(
        verbose = cli.global.verbose,
        quiet = cli.global.quiet,
        no_color = cli.global.no_color,
        "CLI started"
    );

    let verbose = cli.global.verbose > 0;
    match run(cli) {
        Ok(()) => {
            info!("defai-element completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => handle_error(e, verbose),
    }
}

/// Load the configuration, then dispatch to the command handler.
#[instrument(skip_all)]
fn run(cli: Cli) -> CliResult<()> {
    // ── 3. Load configuration ─────────────────────────────────────────────
    let store = ConfigStore::locate(cli.global.config.as_deref())?;
    let (config, unreadable) = match store.load() {
        Ok(config) => (config, None),
        // `config` must still run so a broken file can be inspected or reset.
        Err(e) if matches!(cli.command, Commands::Config(_)) => {
            warn!(error = %e, "falling back to default configuration");
            (CliConfig::from_env(), Some(e))
        }
        Err(e) => return Err(e),
    };
    debug!(path = %store.path().display(), api_url = %config.api_url, "config loaded");

    // ── 4. Context ────────────────────────────────────────────────────────
    let ctx = Context::new(cli.global, store, config);
    if let Some(e) = unreadable {
        ctx.output.warning(&format!("{e}; showing defaults"))?;
    }

    // ── 5. Dispatch ───────────────────────────────────────────────────────
    match cli.command {
        Commands::Create(args) => commands::create::execute(args, &ctx),
        Commands::Init(args) => commands::create::init(args, &ctx),
        Commands::Dev(args) => commands::dev::execute(args, &ctx),
        Commands::Build(args) => commands::build::execute(args, &ctx),
        Commands::Validate(args) => commands::validate::execute(args, &ctx),
        Commands::Publish(args) => commands::publish::execute(args, &ctx),
        Commands::Login(args) => commands::login::execute(args, &ctx),
        Commands::Logout => commands::login::logout(&ctx),
        Commands::Stats(args) => commands::stats::execute(args, &ctx),
        Commands::List(args) => commands::list::execute(args, &ctx),
        Commands::Test(args) => commands::test::execute(args, &ctx),
        Commands::Config(args) => commands::config::execute(args, &ctx),
        Commands::Templates(args) => commands::templates::execute(args, &ctx),
        Commands::Info => commands::info::execute(&ctx),
        Commands::Docs(args) => commands::docs::execute(args, &ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// The single place where structured errors become stderr output and an
/// exit code.
fn handle_error(err: CliError, verbose: bool) -> ExitCode {
    err.log();

    let msg = if std::io::stderr().is_terminal() {
        err.format_colored(verbose)
    } else {
        err.format_plain(verbose)
    };
    eprint!("{msg}");

    ExitCode::from(err.exit_code())
}

// ── tests ─────────────────────────────────────────────────────────────────────
