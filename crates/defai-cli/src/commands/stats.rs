//! `defai-element stats`.

use tracing::instrument;

use defai_adapters::marketplace::ElementStats;

use crate::{
    cli::{StatsArgs, TableFormat},
    commands::{Context, block_on},
    error::CliResult,
};

const HEADERS: [&str; 5] = ["ELEMENT", "DOWNLOADS", "REVENUE", "RATING", "REVIEWS"];

#[instrument(skip_all, fields(element = args.element_id.as_deref(), days = args.days))]
pub fn execute(args: StatsArgs, ctx: &Context) -> CliResult<()> {
    let client = ctx.authenticated_marketplace()?;

    let spinner = ctx.output.spinner("Fetching statistics...");
    let stats = match block_on(client.stats(args.element_id.as_deref(), Some(args.days)))? {
        Ok(stats) => stats,
        Err(e) => {
            spinner.clear();
            return Err(e.into());
        }
    };
    spinner.clear();

    match args.format {
        TableFormat::Json => ctx.output.json(&stats)?,
        TableFormat::Csv => ctx.output.csv(&HEADERS, &rows(&stats))?,
        TableFormat::Table => {
            if stats.is_empty() {
                ctx.output.info("No statistics yet")?;
                return Ok(());
            }
            ctx.output
                .header(&format!("Element statistics (last {} days)", args.days))?;
            ctx.output.table(&HEADERS, &rows(&stats))?;
            if stats.len() > 1 {
                let downloads: u64 = stats.iter().map(|s| s.downloads).sum();
                let revenue: f64 = stats.iter().map(|s| s.revenue).sum();
                ctx.output.print("")?;
                ctx.output.field("Total downloads", &downloads.to_string(), 16)?;
                ctx.output
                    .field("Total revenue", &format!("{revenue:.2} DEFAI"), 16)?;
            }
        }
    }
    Ok(())
}

fn rows(stats: &[ElementStats]) -> Vec<Vec<String>> {
    stats
        .iter()
        .map(|s| {
            vec![
                s.name
                    .clone()
                    .or_else(|| s.element_id.clone())
                    .unwrap_or_else(|| "-".into()),
                s.downloads.to_string(),
                format!("{:.2}", s.revenue),
                format!("{:.1}", s.rating),
                s.reviews.to_string(),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_fall_back_to_the_element_id() {
        let stats = vec![
            ElementStats {
                element_id: Some("el_1".into()),
                name: Some("Price Ticker".into()),
                downloads: 120,
                revenue: 45.5,
                rating: 4.5,
                reviews: 8,
            },
            ElementStats {
                element_id: Some("el_2".into()),
                ..ElementStats::default()
            },
        ];
        let rows = rows(&stats);
        assert_eq!(rows[0], ["Price Ticker", "120", "45.50", "4.5", "8"]);
        assert_eq!(rows[1][0], "el_2");
    }
}
