//! `defai-element test`: jest, or playwright with `--e2e`.

use tracing::instrument;

use defai_adapters::{PackageManager, TestOptions};

use crate::{
    cli::TestArgs,
    commands::{Context, block_on, project_dir},
    error::CliResult,
};

/// Test output goes straight to the terminal; a failing run exits 1.
#[instrument(skip_all, fields(dir = %args.dir.display(), e2e = args.e2e))]
pub fn execute(args: TestArgs, ctx: &Context) -> CliResult<()> {
    let dir = project_dir(&args.dir)?;
    let options = TestOptions {
        watch: args.watch,
        coverage: args.coverage,
        e2e: args.e2e,
    };

    let suite = if options.e2e { "end-to-end tests" } else { "tests" };
    ctx.output.info(&format!("Running {suite}..."))?;
    block_on(PackageManager::new().run_tests(&dir, options))??;
    ctx.output.success("All tests passed")?;
    Ok(())
}
