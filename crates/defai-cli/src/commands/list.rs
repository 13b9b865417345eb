//! `defai-element list`: the user's published elements.

use std::cmp::Ordering;

use tracing::instrument;

use defai_adapters::marketplace::ElementSummary;

use crate::{
    cli::{ListArgs, SortField, TableFormat},
    commands::{Context, block_on},
    error::CliResult,
};

const HEADERS: [&str; 7] = ["ID", "NAME", "VERSION", "TIER", "PRICE", "DOWNLOADS", "STATUS"];

#[instrument(skip_all, fields(all = args.all))]
pub fn execute(args: ListArgs, ctx: &Context) -> CliResult<()> {
    let client = ctx.authenticated_marketplace()?;

    let spinner = ctx.output.spinner("Fetching your elements...");
    let mut elements = match block_on(client.list(args.all))? {
        Ok(elements) => elements,
        Err(e) => {
            spinner.clear();
            return Err(e.into());
        }
    };
    spinner.clear();
    sort(&mut elements, args.sort);

    match args.format {
        TableFormat::Json => ctx.output.json(&elements)?,
        TableFormat::Csv => ctx.output.csv(&HEADERS, &rows(&elements))?,
        TableFormat::Table => {
            if elements.is_empty() {
                ctx.output.info("You have not published any elements yet")?;
                ctx.output.hint("  Run: defai-element publish")?;
                return Ok(());
            }
            ctx.output
                .header(&format!("Your elements ({})", elements.len()))?;
            ctx.output.table(&HEADERS, &rows(&elements))?;
        }
    }
    Ok(())
}

/// Names ascending; counts and revenue descending.
fn sort(elements: &mut [ElementSummary], field: SortField) {
    match field {
        SortField::Name => elements.sort_by_key(|e| e.name.to_lowercase()),
        SortField::Downloads => elements.sort_by(|a, b| b.downloads.cmp(&a.downloads)),
        SortField::Revenue => elements.sort_by(|a, b| {
            b.revenue
                .partial_cmp(&a.revenue)
                .unwrap_or(Ordering::Equal)
        }),
    }
}

fn rows(elements: &[ElementSummary]) -> Vec<Vec<String>> {
    elements
        .iter()
        .map(|e| {
            vec![
                e.id.clone(),
                e.name.clone(),
                e.version.clone(),
                e.tier.clone().unwrap_or_else(|| "free".into()),
                if e.price > 0.0 {
                    format!("{} DEFAI", e.price)
                } else {
                    "Free".into()
                },
                e.downloads.to_string(),
                e.status.clone().unwrap_or_else(|| "-".into()),
            ]
        })
        .collect()
}
