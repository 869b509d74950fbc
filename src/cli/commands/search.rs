//! Provider listing, search and child browsing commands.

use tokio::runtime::Runtime;

use super::{page_count, page_cursor};
use crate::config::Config;
use crate::mediator::NextStep;
use crate::model::{SearchResult, SearchResultPage};
use crate::provider::SearchQuery;
use crate::registry::AdapterRegistry;

/// List registered providers and entity types
pub fn cmd_providers(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let registry = AdapterRegistry::from_config(config).await?;

        println!("Providers:");
        for (id, info) in registry.providers() {
            let marker = if id == config.import.provider { "*" } else { " " };
            println!("{} {:<12} {} - {}", marker, id, info.name, info.description);
            for (search_type, label) in &info.search_types {
                let kind = if info.returns_releases(search_type) {
                    "releases"
                } else {
                    "browse"
                };
                print!("    {:<10} {} ({})", search_type, label, kind);
                if let Some(filters) = info.filters_for(search_type) {
                    let keys: Vec<&str> = filters.keys().map(String::as_str).collect();
                    print!(" filters: {}", keys.join(", "));
                }
                println!();
            }
        }

        println!();
        println!("Entities:");
        for (id, info) in registry.entities() {
            let marker = if id == config.import.entity { "*" } else { " " };
            println!("{} {:<12} {} - {}", marker, id, info.name, info.description);
        }

        Ok(())
    })
}

/// Search the selected provider
pub fn cmd_search(
    rt: &Runtime,
    config: &Config,
    term: &str,
    search_type: &str,
    filter: Option<&str>,
    page: usize,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let registry = AdapterRegistry::from_config(config).await?;
        let mediator = registry.select(&config.selection())?;

        let mut query = SearchQuery::new(term, search_type)
            .with_cursor(page_cursor(config.import.per_page, page));
        if let Some(filter) = filter {
            query = query.with_filter(filter);
        }

        let outcome = mediator.search(&query).await?;
        print_page(&outcome.page, config.import.per_page, page);

        if let Some(first) = outcome.page.results.first() {
            println!();
            match outcome.next {
                NextStep::ViewRelease => {
                    println!("Preview with: discog-mediator show {}", first.id);
                    println!("Import with:  discog-mediator import {}", first.id);
                }
                NextStep::BrowseChildren => {
                    println!("Browse with:  discog-mediator browse {} {}", search_type, first.id);
                }
            }
        }

        Ok(())
    })
}

/// List the releases under an artist or label
pub fn cmd_browse(
    rt: &Runtime,
    config: &Config,
    search_type: &str,
    id: &str,
    page: usize,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let registry = AdapterRegistry::from_config(config).await?;
        let mediator = registry.select(&config.selection())?;

        let children = mediator
            .browse_children(search_type, id, page_cursor(config.import.per_page, page))
            .await?;

        if let Some(info) = &children.info {
            if let Some(name) = &info.name {
                println!("{}", name);
            }
            if let Some(url) = &info.provider_url {
                println!("  {}", url);
            }
            println!();
        }

        print_page(&children.page, config.import.per_page, page);
        Ok(())
    })
}

fn print_page(page: &SearchResultPage, per_page: usize, page_number: usize) {
    if page.results.is_empty() {
        println!("No results.");
        return;
    }

    println!(
        "Page {} of {} ({} results)",
        page_number.max(1),
        page_count(page.total_results, per_page).max(1),
        page.total_results
    );
    println!();
    for result in &page.results {
        println!("{}", format_result(result));
    }
}

/// One-line summary of a search row.
fn format_result(result: &SearchResult) -> String {
    let mut line = format!("{:>10}  {}", result.id, result.title);

    let details: Vec<&str> = [
        result.release_artist.as_deref(),
        result.release_label.as_deref(),
        result.release_catalog_number.as_deref(),
        result.release_format.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|s| !s.is_empty())
    .collect();

    if !details.is_empty() {
        line.push_str(&format!(" [{}]", details.join(" | ")));
    }
    line
}
