//! List command.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use console::style;

use mangacrawl::config::{Config, SeriesConfig};
use mangacrawl::scrapers::HttpClient;
use mangacrawl::services::SeriesDownloader;

/// Print each series' chapters, oldest first, with their target directory.
pub async fn cmd_list(
    config: &Config,
    output_dir: &Path,
    series_list: &[SeriesConfig],
) -> anyhow::Result<()> {
    let client = HttpClient::new(&config.http_client_config())
        .context("Failed to create HTTP client")?;
    let downloader = SeriesDownloader::new(Arc::new(client), config.download_config());

    for series in series_list {
        let links = downloader
            .discover(series)
            .await
            .with_context(|| format!("Listing {}", series.title))?;
        let root = output_dir.join(&series.directory);

        println!(
            "{} ({} chapters)",
            style(&series.title).bold(),
            links.len()
        );
        for link in links {
            let directory = link.identity.directory();
            let marker = if root.join(&directory).exists() {
                style("skip").dim()
            } else {
                style("new ").green()
            };
            println!("  {} {}  {}", marker, directory, style(&link.url).dim());
        }
    }

    Ok(())
}
