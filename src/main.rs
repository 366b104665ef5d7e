//! # Weekly Affairs Fetch
//!
//! Discovers weekly current-affairs PDF bulletins across several sites,
//! deduplicates them by edition date, and downloads each unique edition
//! exactly once with the edition date stamped into the file's timestamps.
//!
//! ## Usage
//!
//! ```sh
//! weekly_affairs_fetch
//! weekly_affairs_fetch -o ./bulletins --proximity-days 6
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Rendering**: A single headless browser session loads each source's
//!    archive page and scrolls it out to trigger lazy-loaded entries
//! 2. **Extraction**: A per-source rule turns the rendered HTML into raw
//!    `(label, link)` candidates
//! 3. **Deduplication**: Candidates are dated from their labels and admitted
//!    unless a kept edition lies within the proximity window
//! 4. **Download**: Each canonical document streams to a deterministic
//!    filename, one transfer at a time; existing files are skipped
//!
//! Everything runs sequentially: sources in registry order, downloads one at
//! a time. The filesystem is the only state carried between runs.

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod browser;
mod cli;
mod dates;
mod dedup;
mod download;
mod models;
mod sources;
mod utils;

use browser::PageRenderer;
use cli::Cli;
use dedup::Deduplicator;
use sources::SourceDescriptor;

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
    info!("weekly_affairs_fetch starting up");

    let args = Cli::parse();
    debug!(?args.output_dir, ?args.proximity_days, "Parsed CLI arguments");

    let registry = sources::registry()?;
    let mut dedup = Deduplicator::new(args.proximity_days);

    // ---- Discovery ----
    // The browser session must come down on the failure path too, so the
    // discovery result is only propagated after the close.
    let renderer = PageRenderer::launch(args.chrome_path.as_deref()).await?;
    let discovery = discover(&renderer, &registry, &mut dedup).await;
    if let Err(e) = renderer.close().await {
        warn!(error = %e, "Browser did not shut down cleanly");
    }
    discovery?;

    info!(count = dedup.len(), "Discovered canonical documents");

    // ---- Download phase ----
    let documents = dedup.into_documents();
    let client = reqwest::Client::new();
    let stats = download::materialize_all(&client, documents, Path::new(&args.output_dir)).await?;

    let elapsed = start_time.elapsed();
    info!(
        downloaded = stats.downloaded,
        skipped = stats.skipped,
        failed = stats.failed,
        secs = elapsed.as_secs(),
        "Execution complete"
    );

    Ok(())
}

/// Render each source in registry order and offer every extracted candidate
/// to the deduplicator. Rendering and structural extraction failures are
/// fatal to the run.
async fn discover(
    renderer: &PageRenderer,
    registry: &[SourceDescriptor],
    dedup: &mut Deduplicator,
) -> Result<(), Box<dyn Error>> {
    for source in registry {
        let html = renderer.render(&source.location).await?;
        let candidates = source.extract.extract(&html, &source.location)?;
        info!(
            count = candidates.len(),
            source = %source.location,
            "Extracted candidates"
        );
        for candidate in candidates {
            dedup.offer(candidate);
        }
    }
    Ok(())
}
