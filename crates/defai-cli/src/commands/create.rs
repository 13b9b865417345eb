//! `defai-element create` and `defai-element init`.
//!
//! Both materialize a template through `MaterializeService`; `create` makes
//! a new directory, `init` fills the current one. No business logic lives
//! here.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use defai_adapters::{ElementRenderer, InMemoryStore, LocalFilesystem, PackageManager};
use defai_core::{
    application::{ConflictPolicy, CreateRequest, MaterializeService, TemplateService},
    domain::{
        Category, DEFAULT_AUTHOR, DEFAULT_DESCRIPTION, ElementDetails, TemplateId, Tier,
        title_case, validation::validate_element_name,
    },
};

use crate::{
    cli::{CreateArgs, DetailArgs, InitArgs},
    commands::{Context, block_on, template_store},
    error::{CliError, CliResult, IntoCli},
    prompt::Prompter,
};

/// Execute `defai-element create`.
///
/// 1. Validate the name and the template before asking anything
/// 2. Resolve a directory conflict (`--force`, confirmation, or cancel)
/// 3. Collect the element details
/// 4. Materialize, then optionally install dependencies
#[instrument(skip_all, fields(element = %args.name))]
pub fn execute(args: CreateArgs, ctx: &Context) -> CliResult<()> {
    let slug = checked_slug(&args.name)?;
    let template = resolve_template(args.template.as_deref(), ctx)?;
    let target = args
        .directory
        .clone()
        .unwrap_or_else(|| PathBuf::from(&slug));

    let policy = if has_content(&target) {
        if args.force {
            ConflictPolicy::Replace
        } else if ctx.prompter.is_interactive()
            && ctx.prompter.confirm(
                &format!("Directory {} already exists. Overwrite?", target.display()),
                false,
            )?
        {
            ConflictPolicy::Replace
        } else {
            ctx.output.warning("Creation cancelled")?;
            ctx.output
                .hint(&format!("  Use --force to overwrite {}", target.display()))?;
            return Ok(());
        }
    } else {
        ConflictPolicy::Abort
    };

    let details = collect_details(&ctx.prompter, &slug, &args.details)?;
    materialize(ctx, template, details, &target, policy, args.skip_install)?;

    ctx.output.print("")?;
    ctx.output.header("Next steps:")?;
    ctx.output.print(&format!("  cd {}", target.display()))?;
    if args.skip_install {
        ctx.output.print("  npm install")?;
    }
    ctx.output.print("  defai-element dev")?;
    Ok(())
}

/// Execute `defai-element init` in the current directory.
#[instrument(skip_all)]
pub fn init(args: InitArgs, ctx: &Context) -> CliResult<()> {
    let cwd = std::env::current_dir().with_cli_context(|| "reading the current directory")?;
    let name = cwd
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::invalid_input("the current directory has no usable name"))?;
    let slug = checked_slug(name)?;
    let template = resolve_template(args.template.as_deref(), ctx)?;

    if has_content(&cwd)
        && !args.force
        && !(ctx.prompter.is_interactive()
            && ctx
                .prompter
                .confirm("Current directory is not empty. Initialize anyway?", false)?)
    {
        ctx.output.warning("Initialization cancelled")?;
        ctx.output.hint("  Use --force to initialize a non-empty directory")?;
        return Ok(());
    }

    let details = collect_details(&ctx.prompter, &slug, &args.details)?;
    materialize(ctx, template, details, &cwd, ConflictPolicy::Merge, args.skip_install)?;

    ctx.output.print("")?;
    ctx.output.header("Next steps:")?;
    ctx.output.print("  defai-element dev")?;
    Ok(())
}

// ── shared steps ──────────────────────────────────────────────────────────────

fn checked_slug(name: &str) -> CliResult<String> {
    if !validate_element_name(name) {
        return Err(CliError::InvalidElementName { name: name.into() });
    }
    Ok(name.to_string())
}

/// Flag, then `defaultTemplate`; unknown ids fail before any prompt.
fn resolve_template(flag: Option<&str>, ctx: &Context) -> CliResult<(TemplateId, InMemoryStore)> {
    let raw = flag.unwrap_or(&ctx.config.default_template);
    let id = TemplateId::parse(raw).map_err(|e| CliError::Core(e.into()))?;
    let store = template_store()?;
    TemplateService::new(Box::new(store.clone())).get(&id)?;
    Ok((id, store))
}

fn has_content(dir: &Path) -> bool {
    dir.exists()
        && std::fs::read_dir(dir)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(true)
}

fn materialize(
    ctx: &Context,
    (template, store): (TemplateId, InMemoryStore),
    details: ElementDetails,
    target: &Path,
    policy: ConflictPolicy,
    skip_install: bool,
) -> CliResult<()> {
    let name = details.display_name.clone();
    let spinner = ctx.output.spinner(format!("Creating {name}..."));
    let service = MaterializeService::new(
        Box::new(store),
        Box::new(ElementRenderer::new()),
        Box::new(LocalFilesystem::new()),
    );
    let request = CreateRequest::new(template, details, target).on_conflict(policy);
    let outcome = match service.create(&request) {
        Ok(outcome) => outcome,
        Err(e) => {
            spinner.clear();
            return Err(e.into());
        }
    };
    spinner.succeed(&format!("Created {name} from the {} template", outcome.template));
    info!(files = outcome.files_written, root = %outcome.root.display(), "element created");
    ctx.output.success(&format!(
        "Element created at {} ({} files)",
        outcome.root.display(),
        outcome.files_written
    ))?;

    if skip_install || !ctx.prompter.confirm("Install dependencies now?", true)? {
        return Ok(());
    }
    install(ctx, &outcome.root)
}

/// A failed install leaves a usable project; it only warns.
fn install(ctx: &Context, root: &Path) -> CliResult<()> {
    let spinner = ctx.output.spinner("Installing dependencies...");
    match block_on(PackageManager::new().install(root))? {
        Ok(()) => {
            spinner.succeed("Dependencies installed");
            Ok(())
        }
        Err(e) => {
            spinner.clear();
            warn!(error = %e, "dependency install failed");
            ctx.output.warning(&format!("Failed to install dependencies: {e}"))?;
            ctx.output
                .hint(&format!("  Run manually: cd {} && npm install", root.display()))?;
            Ok(())
        }
    }
}

/// Flags first, then prompts, then defaults.
pub(crate) fn collect_details(
    prompter: &Prompter,
    slug: &str,
    flags: &DetailArgs,
) -> CliResult<ElementDetails> {
    let mut details = ElementDetails::new(slug).map_err(|e| CliError::Core(e.into()))?;

    let display_name = match &flags.display_name {
        Some(name) => name.clone(),
        None => prompter.input("Display name", &title_case(slug), not_empty)?,
    };
    let description = match &flags.description {
        Some(text) => text.clone(),
        None => prompter.input("Description", DEFAULT_DESCRIPTION, not_empty)?,
    };
    let author = match &flags.author {
        Some(author) => author.clone(),
        None => prompter.input("Author", &default_author(), not_empty)?,
    };
    let category = match flags.category {
        Some(category) => category,
        None => prompter.select("Category", &Category::ALL, Category::default())?,
    };
    let tier = match flags.tier {
        Some(tier) => tier,
        None => prompter.select("Minimum tier", &Tier::ALL, Tier::default())?,
    };
    let price = match flags.price {
        Some(price) => price,
        None => prompter
            .input("Price in DEFAI (0 for free)", "0", valid_price)?
            .parse()
            .map_err(|_| CliError::invalid_input("price must be a number"))?,
    };

    details = details
        .with_display_name(display_name)
        .with_description(description)
        .with_author(author)
        .with_category(category)
        .with_tier(tier)
        .with_price(price)
        .map_err(|e| CliError::Core(e.into()))?;
    Ok(details)
}

fn default_author() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|user| !user.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_AUTHOR.to_string())
}

fn not_empty(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err("a value is required".into())
    } else {
        Ok(())
    }
}

pub(crate) fn valid_price(value: &str) -> Result<(), String> {
    match value.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(()),
        _ => Err("price must be a non-negative number".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_skip_every_prompt() {
        let flags = DetailArgs {
            display_name: Some("Whale Watch".into()),
            description: Some("Tracks large transfers".into()),
            author: Some("Ada".into()),
            category: Some(Category::Analytics),
            tier: Some(Tier::Gold),
            price: Some(12.5),
        };
        let details = collect_details(&Prompter::non_interactive(false), "whale-watch", &flags)
            .unwrap();
        assert_eq!(details.display_name, "Whale Watch");
        assert_eq!(details.author, "Ada");
        assert_eq!(details.category, Category::Analytics);
        assert_eq!(details.tier, Tier::Gold);
        assert_eq!(details.price, 12.5);
    }

    #[test]
    fn defaults_fill_unanswered_details() {
        let details = collect_details(
            &Prompter::non_interactive(true),
            "price-ticker",
            &DetailArgs::default(),
        )
        .unwrap();
        assert_eq!(details.display_name, "Price Ticker");
        assert_eq!(details.description, DEFAULT_DESCRIPTION);
        assert_eq!(details.category, Category::Utilities);
        assert_eq!(details.tier, Tier::Free);
        assert_eq!(details.price, 0.0);
    }

    #[test]
    fn negative_price_is_rejected() {
        let flags = DetailArgs {
            price: Some(-1.0),
            ..DetailArgs::default()
        };
        assert!(collect_details(&Prompter::non_interactive(true), "my-widget", &flags).is_err());
        assert!(valid_price("-3").is_err());
        assert!(valid_price("abc").is_err());
        assert!(valid_price("2.5").is_ok());
    }

    #[test]
    fn bad_slugs_fail_before_anything_else() {
        assert!(matches!(
            checked_slug("My--App"),
            Err(CliError::InvalidElementName { .. })
        ));
        assert_eq!(checked_slug("my-app-1").unwrap(), "my-app-1");
    }

    #[test]
    fn empty_directories_have_no_content() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!has_content(dir.path()));
        assert!(!has_content(&dir.path().join("missing")));
        std::fs::write(dir.path().join("file"), "x").unwrap();
        assert!(has_content(dir.path()));
    }
}
