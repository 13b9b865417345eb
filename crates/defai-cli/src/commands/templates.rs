//! `defai-element templates`: the starter template catalog.

use tracing::instrument;

use defai_core::application::{TemplateInfo, TemplateService};

use crate::{
    cli::{ListFormat, TemplatesArgs},
    commands::{Context, template_store},
    error::CliResult,
};

const HEADERS: [&str; 4] = ["ID", "NAME", "ENTRY", "DESCRIPTION"];

#[instrument(skip_all)]
pub fn execute(args: TemplatesArgs, ctx: &Context) -> CliResult<()> {
    let service = TemplateService::new(Box::new(template_store()?));
    let templates = service.list()?;

    match args.format {
        ListFormat::Json => ctx.output.json(&templates)?,
        ListFormat::Csv => ctx.output.csv(&HEADERS, &rows(&templates))?,
        ListFormat::List => {
            for template in &templates {
                ctx.output.data(&template.id)?;
            }
        }
        ListFormat::Table => {
            ctx.output.header("Available templates:")?;
            ctx.output.table(&HEADERS, &rows(&templates))?;
            ctx.output.print("")?;
            ctx.output.hint(&format!(
                "  Default: {}. Use: defai-element create <name> --template <id>",
                ctx.config.default_template
            ))?;
        }
    }
    Ok(())
}

fn rows(templates: &[TemplateInfo]) -> Vec<Vec<String>> {
    templates
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.name.clone(),
                t.entry.clone(),
                t.description.clone(),
            ]
        })
        .collect()
}
