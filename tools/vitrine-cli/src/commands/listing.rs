//! Listing commands: browse, sales and search.

use anyhow::{Context as _, Result};
use chrono::Utc;
use dialoguer::Confirm;
use serde::Serialize;
use vitrine_catalog::QueryKey;
use vitrine_query::{LoadOutcome, MetricsSnapshot, QueryHandle, QuerySnapshot};

use super::{BrowseArgs, ListArgs, SearchArgs};
use crate::context::Context;
use crate::output::status_badge;

/// Run the browse command.
pub async fn browse(args: BrowseArgs, ctx: &Context) -> Result<()> {
    let key = match args.category {
        Some(name) => QueryKey::category(name),
        None => QueryKey::All,
    };
    run(key, &args.list, ctx).await
}

/// Run the sales command.
pub async fn sales(args: ListArgs, ctx: &Context) -> Result<()> {
    run(QueryKey::Discounted, &args, ctx).await
}

/// Run the search command.
pub async fn search(args: SearchArgs, ctx: &Context) -> Result<()> {
    run(QueryKey::search(&args.text), &args.list, ctx).await
}

#[derive(Serialize)]
struct ListingReport {
    cache_key: String,
    listing: QuerySnapshot,
    metrics: MetricsSnapshot,
}

fn title(key: &QueryKey) -> String {
    match key {
        QueryKey::All => "All listings".to_string(),
        QueryKey::Category(name) => format!("Category: {}", name),
        QueryKey::Discounted => "On sale".to_string(),
        QueryKey::Search(text) => format!("Search: \"{}\"", text),
    }
}

async fn run(key: QueryKey, args: &ListArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let handle = client.query(key);

    ctx.output.header(&title(handle.key()));
    ctx.output.table_row(
        &["Item", "Price", "Category", "Location", "Listed"],
        &[28, 12, 14, 12, 10],
    );

    let mut pages = 0;
    let mut shown = 0;
    while handle.has_more() {
        let wanted = args.all || pages < args.pages;
        if !wanted && !(args.interactive && confirm("Load more?", true)?) {
            break;
        }

        let spinner = ctx.output.spinner(if pages == 0 {
            "Loading..."
        } else {
            "Loading more..."
        });
        let result = handle.load_more().await;
        spinner.finish_and_clear();

        match result {
            Ok(LoadOutcome::Appended { .. }) => {
                pages += 1;
                shown = print_new_items(&handle, shown, ctx);
            }
            Ok(LoadOutcome::Skipped(_)) | Ok(LoadOutcome::Discarded) => break,
            Err(e) => {
                ctx.output.warn(&e.to_string());
                if args.interactive && confirm("Retry?", true)? {
                    continue;
                }
                return Err(e).with_context(|| format!("Failed to load {}", handle.key()));
            }
        }
    }

    report(&client.metrics(), &handle, ctx);
    Ok(())
}

fn print_new_items(handle: &QueryHandle, shown: usize, ctx: &Context) -> usize {
    let items = handle.items();
    let now = Utc::now();
    for item in items.iter().skip(shown) {
        ctx.output.item_row(item, now);
    }
    items.len()
}

fn report(metrics: &MetricsSnapshot, handle: &QueryHandle, ctx: &Context) {
    let snapshot = handle.snapshot();

    if ctx.output.is_json() {
        ctx.output.json(&ListingReport {
            cache_key: snapshot.key.cache_key(),
            listing: snapshot,
            metrics: *metrics,
        });
        return;
    }

    if snapshot.is_empty() && !snapshot.has_more {
        ctx.output.info("No items found");
        return;
    }

    ctx.output.info("");
    let total = snapshot
        .total
        .map(|t| t.to_string())
        .unwrap_or_else(|| "?".to_string());
    ctx.output.kv("Shown", &format!("{} of {}", snapshot.len(), total));
    ctx.output.kv("Pages", &snapshot.pages_loaded.to_string());
    ctx.output.kv("Status", &status_badge(snapshot.status));
    if snapshot.has_more {
        ctx.output.kv("More", "yes (use --pages, --all or --interactive)");
    }
    ctx.output.debug(&format!(
        "fetches: {}, skipped: {}, failures: {}",
        metrics.fetches_started,
        metrics.skipped_in_flight + metrics.skipped_exhausted,
        metrics.failures
    ));
}

fn confirm(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}
