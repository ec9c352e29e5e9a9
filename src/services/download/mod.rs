//! Series download service.
//!
//! Fetches a series' chapter listing, fans chapter pages out through one
//! runner cohort and each chapter's images through another, and writes
//! `<index>.<ext>` files under the chapter directory. A chapter whose
//! directory already exists is skipped, which is what makes reruns resume.
//!
//! The directory is created before its images are fetched, so an interrupted
//! chapter looks complete to the next run.

mod types;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::SeriesConfig;
use crate::models::ChapterIdentity;
use crate::scrapers::{
    is_absolute_url, resolve_url, select_anchors, select_images, url_extension, FetchError,
    FetchedPage, Fetcher,
};
use crate::services::runner::{BoundedRunner, WorkItem};
use crate::storage::SeriesStore;

pub use types::{ChapterLink, DownloadConfig, DownloadError, DownloadEvent, DownloadSummary};

/// Downloads one series at a time through a shared fetcher.
pub struct SeriesDownloader<F: ?Sized> {
    fetcher: Arc<F>,
    config: DownloadConfig,
}

impl<F> SeriesDownloader<F>
where
    F: Fetcher + ?Sized + 'static,
{
    pub fn new(fetcher: Arc<F>, config: DownloadConfig) -> Self {
        Self { fetcher, config }
    }

    /// Fetch the series root page and return its chapters, oldest first.
    pub async fn discover(
        &self,
        series: &SeriesConfig,
    ) -> Result<Vec<ChapterLink>, DownloadError> {
        let root = self.fetcher.get(&series.url).await?;
        chapter_links(&root.text(), series)
    }

    /// Download every chapter of `series` not already present in `store`.
    ///
    /// The first failed fetch or write aborts the run.
    pub async fn download<S>(
        &self,
        series: &SeriesConfig,
        store: &S,
        event_tx: &mpsc::Sender<DownloadEvent>,
    ) -> Result<DownloadSummary, DownloadError>
    where
        S: SeriesStore + ?Sized,
    {
        let links = self.discover(series).await?;
        let mut summary = DownloadSummary {
            chapters_found: links.len(),
            ..Default::default()
        };
        info!("{}: {} chapters", series.title, links.len());
        let _ = event_tx
            .send(DownloadEvent::ChaptersFound {
                series: series.title.clone(),
                count: links.len(),
            })
            .await;

        let runner = BoundedRunner::new(self.config.chapter_concurrency);
        let mut chapters = runner.run(
            links
                .into_iter()
                .map(|link| WorkItem::new(self.fetch(link.url), link.identity)),
        );

        while let Some(result) = chapters.next().await {
            let (page, identity) = result?;
            let directory = identity.directory();
            info!("{}", identity);

            if store.exists(&directory) {
                info!("{}: skipped", directory);
                summary.chapters_skipped += 1;
                let _ = event_tx
                    .send(DownloadEvent::ChapterSkipped { directory })
                    .await;
                continue;
            }

            store
                .make_dir(&directory, true)
                .map_err(DownloadError::storage(&directory))?;

            let images: Vec<String> = select_images(&page.text(), &series.image_selector)?
                .into_iter()
                .filter(|src| is_absolute_url(src))
                .collect();

            let written = self
                .download_pages(&directory, images, store, event_tx)
                .await?;

            summary.chapters_downloaded += 1;
            summary.pages_written += written;
            let _ = event_tx
                .send(DownloadEvent::ChapterCompleted {
                    directory,
                    pages: written,
                })
                .await;
        }

        Ok(summary)
    }

    /// Fetch one chapter's images and write them as numbered files.
    async fn download_pages<S>(
        &self,
        directory: &str,
        images: Vec<String>,
        store: &S,
        event_tx: &mpsc::Sender<DownloadEvent>,
    ) -> Result<usize, DownloadError>
    where
        S: SeriesStore + ?Sized,
    {
        let _ = event_tx
            .send(DownloadEvent::ChapterStarted {
                directory: directory.to_string(),
                pages: images.len(),
            })
            .await;

        let runner = BoundedRunner::new(self.config.image_concurrency);
        let mut pages = runner.run(
            images
                .into_iter()
                .enumerate()
                .map(|(index, url)| WorkItem::new(self.fetch(url), index)),
        );

        let mut written = 0;
        while let Some(result) = pages.next().await {
            let (image, index) = result?;
            let filename = page_filename(index, &image.url);
            let path = format!("{}/{}", directory, filename);
            store
                .write_bytes(&path, &image.content)
                .map_err(DownloadError::storage(&path))?;
            debug!("{}", path);

            written += 1;
            let _ = event_tx
                .send(DownloadEvent::PageWritten {
                    directory: directory.to_string(),
                    filename,
                    bytes: image.len(),
                })
                .await;
        }

        Ok(written)
    }

    /// Unstarted GET for a runner cohort.
    fn fetch(
        &self,
        url: String,
    ) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send + 'static {
        let fetcher = self.fetcher.clone();
        async move { fetcher.get(&url).await }
    }
}

/// Parse a series root page into its chapter links, oldest first.
///
/// Keeps links whose parsed series title equals `series.title` ignoring
/// case, narrowed by the series' chapter selection. Listings are newest
/// first, so the result is reversed.
pub fn chapter_links(
    html: &str,
    series: &SeriesConfig,
) -> Result<Vec<ChapterLink>, DownloadError> {
    let ranges = series.chapter_ranges()?;

    let mut links: Vec<ChapterLink> = select_anchors(html, &series.chapter_selector)?
        .into_iter()
        .filter_map(|anchor| {
            let identity = ChapterIdentity::parse(&anchor.text);
            if !identity.belongs_to(&series.title) {
                return None;
            }
            if let Some(ranges) = &ranges {
                if !ranges.contains(identity.chapter_id.as_deref()) {
                    return None;
                }
            }
            Some(ChapterLink {
                url: resolve_url(&series.url, &anchor.href),
                identity,
            })
        })
        .collect();

    links.reverse();
    Ok(links)
}

/// File name for the page at `index`: zero-padded index plus the URL's extension.
pub fn page_filename(index: usize, url: &str) -> String {
    format!("{:04}{}", index, url_extension(url))
}
