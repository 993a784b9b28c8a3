//! # Awful News Feed
//!
//! Fetches top headlines or search results from a NewsAPI-compatible
//! provider and renders them as article cards into a standalone HTML page.
//! The last submitted country / search / category filters are persisted and
//! reconciled with the current ones on the next run.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... awful_news_feed --country us --category technology -o ./news.html
//! ```
//!
//! ## Architecture
//!
//! 1. **Transport**: one HTTP request, normalized into a JSON value or an error
//! 2. **Service**: provider URL assembly for top headlines and search
//! 3. **Settings**: persisted filters in a JSON key-value file
//! 4. **View**: load decision, loader, toasts, and card rendering into the page

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod models;
mod page;
mod service;
mod settings;
mod transport;
mod utils;
mod view;

use cli::Cli;
use config::{NewsConfig, load_config};
use models::FilterState;
use page::{HtmlPage, ToastKind};
use service::NewsService;
use settings::{FileStore, SettingsStore};
use transport::HttpTransport;
use utils::ensure_parent_writable;
use view::NewsView;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_feed starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.output, ?args.config, submit = args.submit, "Parsed CLI arguments");

    // ---- Configuration: file, then CLI/env overrides ----
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => NewsConfig::default(),
    };
    if let Some(key) = args.api_key {
        config.api_key = Some(key);
    }
    if let Some(url) = args.base_url {
        config.base_url = url;
    }
    if let Some(path) = args.settings_file {
        config.settings_file = Some(path);
    }
    let api_key = config.require_api_key()?.to_string();

    // Early check: ensure the output document can be written
    if let Err(e) = ensure_parent_writable(&args.output).await {
        error!(
            path = %args.output.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Wire up the controller ----
    let settings_path = config.settings_path();
    let store = FileStore::open(&settings_path)?;
    info!(path = %settings_path.display(), "Using settings file");

    let transport = HttpTransport::new(config.timeout())?;
    let service = NewsService::new(transport, api_key, &config.base_url)?;
    let page = HtmlPage::new(FilterState::new(args.country, args.category, args.search));
    let mut view = NewsView::new(
        service,
        SettingsStore::new(store),
        page,
        config.placeholder_image.clone(),
    );

    if args.submit {
        view.submit().await;
    } else {
        view.start().await;
    }

    // ---- Write the page ----
    let page = view.into_page();
    let errors = page
        .toasts()
        .iter()
        .filter(|t| t.kind == ToastKind::Error)
        .count();
    info!(path = %args.output.display(), "Writing HTML");
    if let Err(e) = tokio::fs::write(&args.output, page.to_html()).await {
        error!(path = %args.output.display(), error = %e, "Failed writing HTML");
        return Err(e.into());
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        articles = page.container().len(),
        errors,
        "Execution complete"
    );

    Ok(())
}
