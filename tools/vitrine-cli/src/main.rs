//! Vitrine CLI - Browse marketplace listings page by page.
//!
//! Commands:
//! - `vitrine browse` - List every item, or one category
//! - `vitrine sales` - List discounted items
//! - `vitrine search` - Search items by text
//! - `vitrine config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use commands::{BrowseArgs, ConfigArgs, ListArgs, SearchArgs};

/// Vitrine CLI - Browse marketplace listings page by page
#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Catalog file (JSON array of items) to browse instead of the demo catalog
    #[arg(long, global = true)]
    catalog: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse all items, or one category
    Browse(BrowseArgs),

    /// Browse discounted items
    Sales(ListArgs),

    /// Search items by name, category or description
    Search(SearchArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(if verbose { "debug" } else { "warn" }),
    };

    fmt::Subscriber::builder()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = context::Context::load(cli.config.as_deref(), cli.catalog.as_deref(), output)?;

    let result = match cli.command {
        Commands::Browse(args) => commands::listing::browse(args, &ctx).await,
        Commands::Sales(args) => commands::listing::sales(args, &ctx).await,
        Commands::Search(args) => commands::listing::search(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_browse_category() {
        let cli = Cli::try_parse_from(["vitrine", "browse", "--category", "Chaussures"]).unwrap();
        match cli.command {
            Commands::Browse(args) => {
                assert_eq!(args.category.as_deref(), Some("Chaussures"));
                assert_eq!(args.list.pages, 1);
            }
            _ => panic!("expected browse"),
        }

        let cli = Cli::try_parse_from(["vitrine", "browse", "-C", "Maison", "-c", "vitrine.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("vitrine.toml"));
        assert!(matches!(cli.command, Commands::Browse(ref args) if args.category.as_deref() == Some("Maison")));
    }

    #[test]
    fn test_sales_all() {
        let cli = Cli::try_parse_from(["vitrine", "--json", "sales", "--all"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Sales(ref args) if args.all && !args.interactive));
    }

    #[test]
    fn test_search_with_pages() {
        let cli = Cli::try_parse_from(["vitrine", "search", "nike", "--pages", "2"]).unwrap();
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.text, "nike");
                assert_eq!(args.list.pages, 2);
                assert!(!args.list.all);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_all_conflicts_with_pages() {
        let err = Cli::try_parse_from(["vitrine", "sales", "--all", "--pages", "3"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_search_requires_text() {
        assert!(Cli::try_parse_from(["vitrine", "search"]).is_err());
    }
}
