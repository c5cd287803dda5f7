//! CLI command implementations.

pub mod config;
pub mod listing;

use clap::{Args, Subcommand};

/// Paging options shared by the listing commands.
#[derive(Args, Clone, Debug)]
pub struct ListArgs {
    /// Number of pages to load.
    #[arg(short, long, default_value = "1")]
    pub pages: u32,

    /// Load every page.
    #[arg(short, long, conflicts_with = "pages")]
    pub all: bool,

    /// Ask before each further page, and offer to retry failed pages.
    #[arg(short, long)]
    pub interactive: bool,
}

/// Arguments for the browse command.
#[derive(Args)]
pub struct BrowseArgs {
    /// Category or sub-category to show ("Tous" shows everything).
    #[arg(short = 'C', long)]
    pub category: Option<String>,

    #[command(flatten)]
    pub list: ListArgs,
}

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for in names, categories and descriptions.
    pub text: String,

    #[command(flatten)]
    pub list: ListArgs,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
