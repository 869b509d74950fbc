//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `search`: provider listing, search and child browsing
//! - `import`: release preview and import
//! - `library`: imported releases and the effective config

mod import;
mod library;
mod search;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

pub use import::{cmd_import, cmd_show};
pub use library::{cmd_config, cmd_library};
pub use search::{cmd_browse, cmd_providers, cmd_search};

use crate::config::{self, Config};
use crate::provider::PageCursor;

/// Discog Mediator CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: OS config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Provider adapter id (overrides config)
    #[arg(short, long, global = true)]
    pub provider: Option<String>,

    /// Release database path (overrides config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Discogs personal access token (or set DISCOGS_TOKEN env var)
    #[arg(long, env = "DISCOGS_TOKEN", global = true, hide_env_values = true)]
    pub discogs_token: Option<String>,

    /// Rows per page (overrides config)
    #[arg(long, global = true)]
    pub per_page: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// List registered providers and entity types
    Providers,
    /// Search the provider
    Search {
        /// Search term
        term: String,
        /// Search type (see `providers`)
        #[arg(short = 't', long = "type", default_value = "release")]
        search_type: String,
        /// Filter for the search type (see `providers`)
        #[arg(short, long)]
        filter: Option<String>,
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// List the releases of an artist or label
    Browse {
        /// Search type the id came from (artist, label)
        search_type: String,
        /// Artist or label id
        id: String,
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Fetch and print a release without importing it
    Show {
        /// Release id
        id: String,
        /// Compact track list
        #[arg(long)]
        teaser: bool,
        /// Print the canonical record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import one or more releases
    Import {
        /// Release ids
        #[arg(required = true)]
        ids: Vec<String>,
        /// Skip image import
        #[arg(long)]
        no_images: bool,
        /// Skip category resolution
        #[arg(long)]
        no_categories: bool,
    },
    /// Show database totals, or one imported release by its stored id
    Library {
        /// Stored release id
        id: Option<i64>,
    },
    /// Print the effective configuration
    Config {
        /// Save it to the config file instead of printing
        #[arg(long)]
        write: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let mut config = load_config(cli);

    match &cli.command {
        Commands::Providers => cmd_providers(&rt, &config),
        Commands::Search {
            term,
            search_type,
            filter,
            page,
        } => cmd_search(&rt, &config, term, search_type, filter.as_deref(), *page),
        Commands::Browse {
            search_type,
            id,
            page,
        } => cmd_browse(&rt, &config, search_type, id, *page),
        Commands::Show { id, teaser, json } => cmd_show(&rt, &config, id, *teaser, *json),
        Commands::Import {
            ids,
            no_images,
            no_categories,
        } => {
            if *no_images {
                config.images.enabled = false;
            }
            if *no_categories {
                config.categories.enabled = false;
            }
            cmd_import(&rt, &config, ids)
        }
        Commands::Library { id } => cmd_library(&rt, &config, *id),
        Commands::Config { write } => cmd_config(&config, *write, cli.config.as_deref()),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Load the config file and apply command-line overrides.
pub(crate) fn load_config(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    if let Some(provider) = &cli.provider {
        config.import.provider = provider.clone();
    }
    if let Some(db) = &cli.db {
        config.storage.database = Some(db.clone());
    }
    if let Some(token) = &cli.discogs_token {
        config.credentials.discogs_token = Some(token.clone());
    }
    if let Some(per_page) = cli.per_page {
        config.import.per_page = per_page;
    }

    config
}

/// Cursor for a 1-based page number.
pub(crate) fn page_cursor(per_page: usize, page: usize) -> PageCursor {
    PageCursor::new(per_page, page.saturating_sub(1) * per_page)
}

/// Number of pages needed for `total` rows.
pub(crate) fn page_count(total: u64, per_page: usize) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page as u64)
}
