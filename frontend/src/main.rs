//! Command-line entry point: runs one listing query against ClickHouse and
//! prints the resulting view as JSON.
//!
//! Usage: `directory <automations|jobs> [search term] [page]`

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use common::{
    listing_schema::{ListingSchema, automation_directory, job_board},
    search_query::SearchTerm,
};
use frontend::{
    api::search_api::{ClickhouseQueryService, listing_changes},
    config::ListingConfig,
    data_definitions::listing_url_state::ListingUrlState,
    listing::DirectoryListing,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn schema_named(name: &str) -> anyhow::Result<ListingSchema> {
    match name {
        "automations" => Ok(automation_directory()),
        "jobs" => Ok(job_board()),
        other => anyhow::bail!("unknown listing {other:?}, expected `automations` or `jobs`"),
    }
}

fn print_view(listing: &DirectoryListing<ClickhouseQueryService>) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&listing.view())?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let schema = schema_named(&args.next().context("missing listing name")?)?;
    let search_term = SearchTerm::new(args.next().unwrap_or_default());
    let page_index = match args.next() {
        Some(page) => page.parse().with_context(|| format!("invalid page {page:?}"))?,
        None => 1,
    };

    let config = ListingConfig::load();
    let schema = config.apply(schema);
    let listing = DirectoryListing::new(schema, Arc::new(ClickhouseQueryService), config.debounce);

    let state = ListingUrlState { search_term, page_index, ..ListingUrlState::default() };
    info!("{}: share link state {}", listing.schema().name, state.to_url_param());
    listing.restore(state).await?;
    print_view(&listing)?;

    let Some(watch_secs) = env::var("DIRECTORY_WATCH_SECS").ok().and_then(|v| v.parse::<u64>().ok()) else {
        return Ok(());
    };
    let period = Duration::from_secs(watch_secs.max(1));
    listing.watch_changes(listing_changes(listing.schema(), period));
    let mut last = listing.view();
    loop {
        tokio::time::sleep(period).await;
        let view = listing.view();
        if view != last && !view.loading {
            print_view(&listing)?;
            last = view;
        }
    }
}
