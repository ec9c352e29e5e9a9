//! Download command.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use console::style;
use tokio::sync::mpsc;

use mangacrawl::config::{Config, SeriesConfig};
use mangacrawl::scrapers::HttpClient;
use mangacrawl::services::{DownloadEvent, SeriesDownloader};
use mangacrawl::storage::LocalStore;

use super::progress::handle_events;

/// Download each series in order, stopping at the first failure.
pub async fn cmd_download(
    config: &Config,
    output_dir: &Path,
    series_list: &[SeriesConfig],
) -> anyhow::Result<()> {
    let client = HttpClient::new(&config.http_client_config())
        .context("Failed to create HTTP client")?;
    let downloader = SeriesDownloader::new(Arc::new(client), config.download_config());

    for series in series_list {
        let root = output_dir.join(&series.directory);
        println!(
            "{} {} → {}",
            style("→").cyan(),
            style(&series.title).bold(),
            root.display()
        );
        let store = LocalStore::open(&root)
            .with_context(|| format!("Failed to create {}", root.display()))?;

        let (event_tx, event_rx) = mpsc::channel::<DownloadEvent>(100);
        let event_handler = tokio::spawn(handle_events(event_rx));

        let result = downloader.download(series, &store, &event_tx).await;
        drop(event_tx);
        let _ = event_handler.await;

        let summary = result.with_context(|| format!("Downloading {}", series.title))?;
        println!(
            "{} {}: {} downloaded, {} skipped, {} pages written",
            style("✓").green(),
            series.title,
            summary.chapters_downloaded,
            summary.chapters_skipped,
            summary.pages_written
        );
    }

    Ok(())
}
