//! `defai-element publish`.
//!
//! Login, strict validation, a finished build, then metadata. The manifest
//! is rewritten before archiving so the bundle ships what was published;
//! a failed upload removes the archive again.

use std::path::Path;

use tracing::{info, instrument, warn};

use defai_adapters::{
    archive::{collect_screenshots, create_bundle, remove_bundle},
    bundler::DEFAULT_OUTPUT_DIR,
    marketplace::PublishRequest,
};
use defai_core::{
    application::ValidationOptions,
    domain::{ElementManifest, MANIFEST_FILE, Tier, validation::is_plain_semver},
};

use crate::{
    cli::PublishArgs,
    commands::{Context, block_on, create::valid_price, project_dir, require_valid},
    error::{CliError, CliResult, IntoCli},
    prompt::Prompter,
};

pub const DEFAULT_ROYALTY: f64 = 5.0;
pub const MAX_ROYALTY: f64 = 20.0;

/// Answers that end up in the published manifest.
#[derive(Debug, Clone, PartialEq)]
struct Listing {
    tier: Tier,
    price: f64,
    royalty: f64,
    version: String,
}

#[instrument(skip_all, fields(dir = %args.dir.display()))]
pub fn execute(args: PublishArgs, ctx: &Context) -> CliResult<()> {
    let client = ctx.authenticated_marketplace()?;
    let dir = project_dir(&args.dir)?;

    if args.skip_validation {
        warn!("publishing without validation");
        ctx.output.warning("Skipping validation")?;
    } else {
        let spinner = ctx.output.spinner("Validating element...");
        if let Err(e) = require_valid(&dir, ValidationOptions::strict()) {
            spinner.clear();
            return Err(e);
        }
        spinner.succeed("Element is valid");
    }

    let dist = dir.join(DEFAULT_OUTPUT_DIR);
    if !dist.is_dir() {
        return Err(CliError::MissingBuild { dir: dist });
    }

    let mut manifest = read_manifest(&dir)?;
    let listing = collect_listing(&args, &manifest, ctx)?;

    let screenshots = collect_screenshots(&dir);
    if screenshots.is_empty() {
        ctx.output.warning(
            "No screenshots found. Add PNG or JPG files to screenshots/ to showcase your element",
        )?;
    }

    apply_listing(&mut manifest, &listing, screenshots, args.tags);
    manifest.published_at = Some(chrono::Utc::now().to_rfc3339());
    let manifest_json = manifest.to_pretty_json();

    if args.dry_run {
        ctx.output.info("Dry run: nothing was uploaded")?;
        ctx.output.data(manifest_json.trim_end())?;
        return Ok(());
    }

    if !ctx.prompter.confirm(
        &format!(
            "Publish {} v{} to the marketplace?",
            manifest.name, manifest.version
        ),
        true,
    )? {
        return Err(CliError::Cancelled);
    }

    write_manifest(&dir, &manifest_json)?;

    let spinner = ctx.output.spinner("Packaging element...");
    let bundle = match create_bundle(&dir, &dist, &manifest_json) {
        Ok(bundle) => bundle,
        Err(e) => {
            spinner.clear();
            return Err(e.into());
        }
    };
    spinner.succeed(&format!(
        "Packaged {} files ({:.2} MB)",
        bundle.entries.len(),
        bundle.size_mb()
    ));

    let request = PublishRequest {
        bundle: bundle.path.clone(),
        tier: listing.tier,
        price: listing.price,
        royalty: listing.royalty,
    };
    let spinner = ctx.output.spinner("Uploading to marketplace...");
    let published = match block_on(client.publish(&request))? {
        Ok(published) => published,
        Err(e) => {
            spinner.clear();
            if let Err(cleanup) = remove_bundle(&bundle.path) {
                warn!(error = %cleanup, "could not remove bundle after failed upload");
            }
            return Err(e.into());
        }
    };
    spinner.succeed("Uploaded");
    info!(element_id = %published.element_id, "element published");

    manifest.element_id = Some(published.element_id.clone());
    write_manifest(&dir, &manifest.to_pretty_json())?;

    ctx.output.success("Element published successfully")?;
    ctx.output.print("")?;
    ctx.output.field("Element ID", &published.element_id, 12)?;
    ctx.output.field("URL", &published.url, 12)?;
    ctx.output.field("Tier", listing.tier.as_str(), 12)?;
    ctx.output.field("Price", &format!("{} DEFAI", listing.price), 12)?;
    ctx.output.field("Royalty", &format!("{}%", listing.royalty), 12)?;
    Ok(())
}

fn read_manifest(dir: &Path) -> CliResult<ElementManifest> {
    let path = dir.join(MANIFEST_FILE);
    let raw = std::fs::read_to_string(&path)
        .with_cli_context(|| format!("reading {}", path.display()))?;
    ElementManifest::parse(&raw).map_err(|errors| CliError::ValidationFailed { errors })
}

fn write_manifest(dir: &Path, json: &str) -> CliResult<()> {
    let path = dir.join(MANIFEST_FILE);
    std::fs::write(&path, json).with_cli_context(|| format!("writing {}", path.display()))
}

/// Flags first, then prompts seeded from the manifest.
fn collect_listing(
    args: &PublishArgs,
    manifest: &ElementManifest,
    ctx: &Context,
) -> CliResult<Listing> {
    let prompter = &ctx.prompter;

    let tier = match args.tier {
        Some(tier) => tier,
        None => prompter.select("Required tier", &Tier::ALL, manifest.tier_required)?,
    };
    let price = match args.price {
        Some(price) => price,
        None => parse_number(&prompter.input(
            "Price in DEFAI (0 for free)",
            &manifest.price.to_string(),
            valid_price,
        )?)?,
    };
    let royalty = match args.royalty {
        Some(royalty) => royalty,
        None => parse_number(&prompter.input(
            "Royalty percentage (0-20)",
            &manifest.royalty.unwrap_or(DEFAULT_ROYALTY).to_string(),
            valid_royalty,
        )?)?,
    };
    let version = listing_version(args.version.as_deref(), manifest, prompter)?;

    valid_price(&price.to_string()).map_err(CliError::invalid_input)?;
    valid_royalty(&royalty.to_string()).map_err(CliError::invalid_input)?;

    Ok(Listing {
        tier,
        price,
        royalty,
        version,
    })
}

fn apply_listing(
    manifest: &mut ElementManifest,
    listing: &Listing,
    screenshots: Vec<String>,
    tags: Option<Vec<String>>,
) {
    manifest.tier_required = listing.tier;
    manifest.price = listing.price;
    manifest.royalty = Some(listing.royalty);
    manifest.version = listing.version.clone();
    manifest.screenshots = screenshots;
    if let Some(tags) = tags {
        manifest.tags = tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
    }
}

fn parse_number(raw: &str) -> CliResult<f64> {
    raw.trim()
        .parse()
        .map_err(|_| CliError::invalid_input(format!("'{raw}' is not a number")))
}

fn valid_royalty(value: &str) -> Result<(), String> {
    match value.trim().parse::<f64>() {
        Ok(royalty) if (0.0..=MAX_ROYALTY).contains(&royalty) => Ok(()),
        _ => Err(format!("royalty must be between 0 and {MAX_ROYALTY}")),
    }
}

/// The validated version, without surrounding whitespace.
fn listing_version(
    flag: Option<&str>,
    manifest: &ElementManifest,
    prompter: &Prompter,
) -> CliResult<String> {
    let version = match flag {
        Some(version) => version.to_string(),
        None => prompter.input("Version", &manifest.version, valid_version)?,
    };
    valid_version(&version).map_err(CliError::invalid_input)?;
    Ok(version.trim().to_string())
}

fn valid_version(value: &str) -> Result<(), String> {
    if is_plain_semver(value.trim()) {
        Ok(())
    } else {
        Err(format!("'{value}' is not a MAJOR.MINOR.PATCH version"))
    }
}
