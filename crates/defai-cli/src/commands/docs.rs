//! `defai-element docs`.

use tracing::instrument;

use crate::{browser, cli::DocsArgs, commands::Context, error::CliResult};

pub const DOCS_URL: &str = "https://docs.defai.com/elements";

#[instrument(skip_all)]
pub fn execute(args: DocsArgs, ctx: &Context) -> CliResult<()> {
    ctx.output.data(DOCS_URL)?;
    if !args.no_open && !browser::open(DOCS_URL) {
        ctx.output.warning("Could not open a browser")?;
    }
    Ok(())
}
