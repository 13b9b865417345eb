//! `defai-element build`.

use tracing::{info, instrument};

use defai_adapters::{
    BundlerOptions, Webpack,
    bundler::{BuildReport, format_size},
};
use defai_core::application::ValidationOptions;

use crate::{
    cli::{BuildArgs, OutputFormat},
    commands::{Context, block_on, project_dir, require_valid},
    error::CliResult,
};

/// Validate, then run one production build and report its assets.
#[instrument(skip_all, fields(dir = %args.dir.display()))]
pub fn execute(args: BuildArgs, ctx: &Context) -> CliResult<()> {
    let dir = project_dir(&args.dir)?;
    require_valid(&dir, ValidationOptions::default())?;

    let options = BundlerOptions {
        output_dir: args.output,
        analyze: args.analyze,
        source_maps: args.source_maps,
        minify: !args.no_minify,
        ..BundlerOptions::production(&dir)
    };

    let spinner = ctx.output.spinner("Building element for production...");
    let report = match block_on(Webpack::new().build(&options))? {
        Ok(report) => report,
        Err(e) => {
            spinner.clear();
            return Err(e.into());
        }
    };
    spinner.succeed("Build completed");
    info!(assets = report.assets.len(), "build reported");

    if ctx.output.format() == OutputFormat::Json {
        ctx.output.json(&report)?;
        return Ok(());
    }
    print_report(ctx, &report)?;
    ctx.output.print("")?;
    ctx.output.success(&format!(
        "Output written to {}",
        options.output_path().display()
    ))?;
    Ok(())
}

fn print_report(ctx: &Context, report: &BuildReport) -> CliResult<()> {
    let rows: Vec<Vec<String>> = report
        .assets
        .iter()
        .map(|asset| vec![asset.name.clone(), format_size(asset.size)])
        .collect();
    if !rows.is_empty() {
        ctx.output.print("")?;
        ctx.output.table(&["ASSET", "SIZE"], &rows)?;
    }
    ctx.output.print("")?;
    ctx.output
        .field("Total size", &format_size(report.total_size()), 12)?;
    if let Some(ms) = report.time_ms {
        ctx.output.field("Build time", &format!("{ms} ms"), 12)?;
    }
    if let Some(hash) = &report.hash {
        ctx.output.field("Hash", hash, 12)?;
    }
    for warning in &report.warnings {
        ctx.output.warning(warning)?;
    }
    Ok(())
}
