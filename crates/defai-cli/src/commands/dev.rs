//! `defai-element dev`: webpack's dev server plus the preview harness.

use tracing::{debug, info, instrument, warn};

use defai_adapters::{
    BundlerOptions, DevSession, Webpack,
    devserver::{SessionEnd, WatchEvent},
};
use defai_core::application::ValidationOptions;

use crate::{
    browser,
    cli::DevArgs,
    commands::{Context, block_on, project_dir, require_valid},
    error::CliResult,
    output::OutputManager,
};

/// Runs in the foreground until Ctrl-C. The watcher closes first, then the
/// dev server, then the preview server.
#[instrument(skip_all, fields(dir = %args.dir.display(), port = args.port))]
pub fn execute(args: DevArgs, ctx: &Context) -> CliResult<()> {
    let dir = project_dir(&args.dir)?;
    require_valid(&dir, ValidationOptions::default())?;

    let options = BundlerOptions {
        port: args.port,
        host: args.host,
        hot: !args.no_hot,
        ..BundlerOptions::development(&dir)
    };
    let open = !args.no_open;
    let printer = ctx.output.clone();

    let end = block_on(async {
        let on_change = move |event| report_change(&printer, event);
        let session = DevSession::start(options, &Webpack::new(), on_change).await?;
        announce(ctx, &session)?;
        if open && !browser::open(&session.urls.preview) {
            ctx.output
                .warning("Could not open a browser; visit the preview URL above")?;
        }
        let end = session
            .run_until(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "could not listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            })
            .await?;
        CliResult::Ok(end)
    })??;

    match end {
        SessionEnd::Interrupted => {
            ctx.output.print("")?;
            ctx.output.info("Development server stopped")?;
        }
        SessionEnd::ServerExited(status) => {
            warn!(%status, "dev server exited on its own");
            ctx.output
                .warning(&format!("Development server exited ({status})"))?;
        }
    }
    Ok(())
}

fn announce(ctx: &Context, session: &DevSession) -> CliResult<()> {
    if session.port != session.requested_port {
        ctx.output.warning(&format!(
            "Port {} is in use, using port {} instead",
            session.requested_port, session.port
        ))?;
    }
    let name = session
        .manifest
        .get("name")
        .and_then(|n| n.as_str())
        .unwrap_or("element");
    info!(port = session.port, "dev session ready");

    ctx.output.success(&format!("Development server running for {name}"))?;
    ctx.output.print("")?;
    ctx.output.field("Local", &session.urls.local, 10)?;
    ctx.output.field("Preview", &session.urls.preview, 10)?;
    ctx.output.field("API docs", &session.urls.api_docs, 10)?;
    ctx.output.print("")?;
    ctx.output.hint("  Press Ctrl+C to stop")?;
    Ok(())
}

/// Runs on the watcher task. Write failures only matter to the log.
fn report_change(output: &OutputManager, event: WatchEvent) {
    let written = match &event {
        WatchEvent::ManifestReloaded => output.info("Manifest updated, preview reloaded"),
        WatchEvent::ManifestInvalid(reason) => {
            output.warning(&format!("manifest.json is invalid, keeping the previous one: {reason}"))
        }
        WatchEvent::SourceChanged(path) => {
            debug!(path = %path.display(), "source changed");
            Ok(())
        }
    };
    if let Err(e) = written {
        debug!(error = %e, ?event, "could not report change");
    }
}
