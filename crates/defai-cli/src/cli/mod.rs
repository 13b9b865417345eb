//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use defai_core::domain::{Category, Tier};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

const LOGO: &str = "\x20  ____  _____ _____ _    ___\n\
\x20 |  _ \\| ____|  ___/ \\  |_ _|\n\
\x20 | | | |  _| | |_ / _ \\  | |\n\
\x20 | |_| | |___|  _/ ___ \\ | |\n\
\x20 |____/|_____|_|/_/   \\_\\___|\n\
\x20 Element Development Kit";

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name     = "defai-element",
    bin_name = "defai-element",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "CLI tool for developing and publishing DEFAI elements",
    before_help = LOGO,
    after_help = "EXAMPLES:\n\
        \x20 defai-element create price-ticker --template trading\n\
        \x20 defai-element dev --port 3000\n\
        \x20 defai-element build && defai-element publish --tier gold --price 10\n\
        \x20 defai-element completions bash > ~/.local/share/bash-completion/completions/defai-element",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new element project.
    #[command(after_help = "EXAMPLES:\n\
        \x20 defai-element create my-widget\n\
        \x20 defai-element create whale-watch --template chart --category analytics --tier gold\n\
        \x20 defai-element create my-widget --directory ./widgets/mine --force --yes")]
    Create(CreateArgs),

    /// Start the development server.
    Dev(DevArgs),

    /// Build the element for production.
    Build(BuildArgs),

    /// Validate element code and configuration.
    Validate(ValidateArgs),

    /// Publish the element to the DEFAI marketplace.
    #[command(after_help = "EXAMPLES:\n\
        \x20 defai-element publish --dry-run\n\
        \x20 defai-element publish --tier silver --price 25 --royalty 10 --yes")]
    Publish(PublishArgs),

    /// Log in to your DEFAI developer account.
    Login(LoginArgs),

    /// Log out of your DEFAI developer account.
    Logout,

    /// View statistics for your elements.
    Stats(StatsArgs),

    /// List your published elements.
    List(ListArgs),

    /// Run element tests.
    Test(TestArgs),

    /// Manage CLI configuration.
    #[command(after_help = "EXAMPLES:\n\
        \x20 defai-element config --list\n\
        \x20 defai-element config --get apiUrl\n\
        \x20 defai-element config --set defaultTemplate=vue\n\
        \x20 defai-element config --reset")]
    Config(ConfigArgs),

    /// Initialize an element in the current directory.
    Init(InitArgs),

    /// List available element templates.
    Templates(TemplatesArgs),

    /// Display environment and configuration info.
    Info,

    /// Open the documentation in a browser.
    Docs(DocsArgs),

    /// Generate shell completion scripts.
    #[command(after_help = "EXAMPLES:\n\
        \x20 defai-element completions bash > ~/.local/share/bash-completion/completions/defai-element\n\
        \x20 defai-element completions zsh  > ~/.zfunc/_defai-element\n\
        \x20 defai-element completions fish > ~/.config/fish/completions/defai-element.fish")]
    Completions(CompletionsArgs),
}

// ── create / init ─────────────────────────────────────────────────────────────

/// Answers normally asked interactively; each one skips its prompt.
#[derive(Debug, Clone, Default, Args)]
pub struct DetailArgs {
    /// Display name shown in the marketplace.
    #[arg(long = "display-name", value_name = "NAME")]
    pub display_name: Option<String>,

    #[arg(long, value_name = "TEXT", help = "Element description")]
    pub description: Option<String>,

    #[arg(long, value_name = "NAME", help = "Author name")]
    pub author: Option<String>,

    #[arg(long, value_parser = parse_category, value_name = "CATEGORY", help = "Marketplace category")]
    pub category: Option<Category>,

    #[arg(long, value_parser = parse_tier, value_name = "TIER", help = "Minimum user tier required")]
    pub tier: Option<Tier>,

    #[arg(long, value_name = "DEFAI", help = "Price in DEFAI tokens (0 for free)")]
    pub price: Option<f64>,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Element slug: lowercase letters, numbers and single hyphens.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Template to start from (default: `defaultTemplate` from config).
    #[arg(short = 't', long = "template", value_name = "TEMPLATE")]
    pub template: Option<String>,

    /// Directory to create the element in (default: ./<NAME>).
    #[arg(short = 'd', long = "directory", value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Overwrite an existing directory without asking (destructive).
    #[arg(long = "force")]
    pub force: bool,

    /// Do not run `npm install`.
    #[arg(long = "skip-install")]
    pub skip_install: bool,

    #[command(flatten)]
    pub details: DetailArgs,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    #[arg(short = 't', long = "template", value_name = "TEMPLATE", help = "Template to start from")]
    pub template: Option<String>,

    /// Initialize even if the directory is not empty.
    #[arg(long = "force")]
    pub force: bool,

    #[arg(long = "skip-install", help = "Do not run `npm install`")]
    pub skip_install: bool,

    #[command(flatten)]
    pub details: DetailArgs,
}

// ── dev / build / validate / test ─────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevArgs {
    #[arg(short = 'p', long, default_value_t = 3000, help = "Port to run the dev server on")]
    pub port: u16,

    #[arg(long, default_value = "localhost", help = "Host to run the dev server on")]
    pub host: String,

    #[arg(long = "no-open", help = "Do not open the browser automatically")]
    pub no_open: bool,

    #[arg(long = "no-hot", help = "Disable hot module replacement")]
    pub no_hot: bool,

    #[arg(long, default_value = ".", value_name = "DIR", help = "Element project directory")]
    pub dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    #[arg(short = 'o', long, default_value = "dist", value_name = "DIR", help = "Output directory")]
    pub output: PathBuf,

    #[arg(long, help = "Write a bundle size report")]
    pub analyze: bool,

    #[arg(long = "source-maps", help = "Generate source maps")]
    pub source_maps: bool,

    #[arg(long = "no-minify", help = "Do not minify the output")]
    pub no_minify: bool,

    #[arg(long, default_value = ".", value_name = "DIR", help = "Element project directory")]
    pub dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, help = "Also check values, size bounds, permissions and naming")]
    pub strict: bool,

    #[arg(long = "security-only", conflicts_with = "strict", help = "Only review requested permissions")]
    pub security_only: bool,

    #[arg(long, help = "Also validate the manifest with the marketplace")]
    pub remote: bool,

    #[arg(long, default_value = ".", value_name = "DIR", help = "Element project directory")]
    pub dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct TestArgs {
    #[arg(long, conflicts_with = "e2e", help = "Run tests in watch mode")]
    pub watch: bool,

    #[arg(long, help = "Generate a coverage report")]
    pub coverage: bool,

    #[arg(long, help = "Run end-to-end tests")]
    pub e2e: bool,

    #[arg(long, default_value = ".", value_name = "DIR", help = "Element project directory")]
    pub dir: PathBuf,
}

// ── publish / login ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PublishArgs {
    #[arg(long, value_parser = parse_tier, help = "Required user tier (free, bronze, silver, gold, titanium)")]
    pub tier: Option<Tier>,

    #[arg(long, help = "Price in DEFAI tokens (0 for free)")]
    pub price: Option<f64>,

    #[arg(long, value_name = "PERCENT", help = "Royalty percentage (0-20) [default: 5]")]
    pub royalty: Option<f64>,

    #[arg(long = "set-version", value_name = "VERSION", help = "Version to publish (x.y.z)")]
    pub version: Option<String>,

    #[arg(long, value_delimiter = ',', value_name = "TAGS", help = "Comma-separated tags")]
    pub tags: Option<Vec<String>>,

    #[arg(long = "dry-run", help = "Show the manifest that would be published")]
    pub dry_run: bool,

    #[arg(long = "skip-validation", help = "Skip validation checks (not recommended)")]
    pub skip_validation: bool,

    #[arg(long, default_value = ".", value_name = "DIR", help = "Element project directory")]
    pub dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long, value_name = "EMAIL", help = "Account email")]
    pub email: Option<String>,

    #[arg(long, env = "DEFAI_PASSWORD", hide_env_values = true, help = "Account password")]
    pub password: Option<String>,

    #[arg(long, value_name = "KEY", conflicts_with_all = ["email", "password"], help = "Store an API key directly")]
    pub key: Option<String>,
}

// ── stats / list ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// One element; all of yours when omitted.
    #[arg(value_name = "ELEMENT_ID")]
    pub element_id: Option<String>,

    #[arg(short = 'd', long, default_value_t = 30, help = "Number of days to show")]
    pub days: u32,

    #[arg(long, value_enum, default_value = "table", help = "Output format")]
    pub format: TableFormat,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, help = "Include unpublished elements")]
    pub all: bool,

    #[arg(long, value_enum, default_value = "name", help = "Sort by field")]
    pub sort: SortField,

    #[arg(long, value_enum, default_value = "table", help = "Output format")]
    pub format: TableFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortField {
    Name,
    Downloads,
    Revenue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableFormat {
    Table,
    Json,
    Csv,
}

// ── templates ─────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TemplatesArgs {
    #[arg(long, value_enum, default_value = "table", help = "Output format")]
    pub format: ListFormat,
}

/// Output format for the `templates` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One id per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── config ────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct ConfigArgs {
    #[arg(long, value_name = "KEY", help = "Print a configuration value")]
    pub get: Option<String>,

    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_assignment, help = "Set a configuration value")]
    pub set: Option<(String, String)>,

    #[arg(long, help = "List all configuration values")]
    pub list: bool,

    #[arg(long, help = "Reset configuration to defaults")]
    pub reset: bool,

    #[arg(long, help = "Print the configuration file path")]
    pub path: bool,
}

// ── docs / completions ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DocsArgs {
    #[arg(long = "no-open", help = "Only print the URL")]
    pub no_open: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── value parsers ─────────────────────────────────────────────────────────────

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse().map_err(|_| {
        let known: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        format!("expected one of: {}", known.join(", "))
    })
}

fn parse_tier(s: &str) -> Result<Tier, String> {
    s.parse().map_err(|_| {
        let known: Vec<&str> = Tier::ALL.iter().map(|t| t.as_str()).collect();
        format!("expected one of: {}", known.join(", "))
    })
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err("expected KEY=VALUE".into()),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_create_with_details() {
        let cli = Cli::parse_from([
            "defai-element",
            "create",
            "whale-watch",
            "--template",
            "chart",
            "--category",
            "ai-tools",
            "--tier",
            "Gold",
            "--price",
            "2.5",
        ]);
        let Commands::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.name, "whale-watch");
        assert_eq!(args.template.as_deref(), Some("chart"));
        assert_eq!(args.details.category, Some(Category::AiTools));
        assert_eq!(args.details.tier, Some(Tier::Gold));
        assert_eq!(args.details.price, Some(2.5));
    }

    #[test]
    fn unknown_tier_lists_choices() {
        let err = Cli::try_parse_from(["defai-element", "publish", "--tier", "platinum"])
            .unwrap_err()
            .to_string();
        assert!(err.contains("titanium"));
    }

    #[test]
    fn config_takes_exactly_one_action() {
        assert!(Cli::try_parse_from(["defai-element", "config"]).is_err());
        assert!(Cli::try_parse_from(["defai-element", "config", "--list", "--reset"]).is_err());

        let cli = Cli::parse_from(["defai-element", "config", "--set", "apiUrl=http://localhost:4000"]);
        let Commands::Config(args) = cli.command else {
            panic!("expected config");
        };
        assert_eq!(
            args.set,
            Some(("apiUrl".to_string(), "http://localhost:4000".to_string()))
        );
    }

    #[test]
    fn assignment_needs_a_key() {
        assert!(parse_assignment("=x").is_err());
        assert!(parse_assignment("novalue").is_err());
        assert_eq!(parse_assignment("a=").unwrap(), ("a".into(), String::new()));
    }

    #[test]
    fn dev_defaults() {
        let cli = Cli::parse_from(["defai-element", "dev"]);
        let Commands::Dev(args) = cli.command else {
            panic!("expected dev");
        };
        assert_eq!(args.port, 3000);
        assert_eq!(args.host, "localhost");
        assert!(!args.no_hot);
        assert_eq!(args.dir, PathBuf::from("."));
    }

    #[test]
    fn publish_tags_split_on_commas() {
        let cli = Cli::parse_from(["defai-element", "publish", "--tags", "defi,charts"]);
        let Commands::Publish(args) = cli.command else {
            panic!("expected publish");
        };
        assert_eq!(args.tags.unwrap(), ["defi", "charts"]);
    }

    #[test]
    fn key_conflicts_with_credentials() {
        assert!(
            Cli::try_parse_from(["defai-element", "login", "--key", "k", "--email", "a@b.co"])
                .is_err()
        );
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["defai-element", "--quiet", "--verbose", "info"]);
        assert!(result.is_err());
    }
}
