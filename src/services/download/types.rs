//! Download service types and events.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::{DEFAULT_CHAPTER_CONCURRENCY, DEFAULT_IMAGE_CONCURRENCY};
use crate::models::{ChapterIdentity, RangeError};
use crate::scrapers::{ExtractError, FetchError};
use crate::services::runner::RunnerError;

/// Events emitted while downloading a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    /// Chapter listing parsed and filtered
    ChaptersFound { series: String, count: usize },
    /// Chapter directory already present, nothing fetched
    ChapterSkipped { directory: String },
    /// Chapter directory created, image fetches starting
    ChapterStarted { directory: String, pages: usize },
    /// One page image written
    PageWritten {
        directory: String,
        filename: String,
        bytes: usize,
    },
    /// Every page of the chapter written
    ChapterCompleted { directory: String, pages: usize },
}

/// Counts for one series run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub chapters_found: usize,
    pub chapters_downloaded: usize,
    pub chapters_skipped: usize,
    pub pages_written: usize,
}

/// Concurrency caps for the two fetch cohorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadConfig {
    pub chapter_concurrency: usize,
    pub image_concurrency: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            chapter_concurrency: DEFAULT_CHAPTER_CONCURRENCY,
            image_concurrency: DEFAULT_IMAGE_CONCURRENCY,
        }
    }
}

/// A chapter link that passed the series filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterLink {
    /// Absolute chapter page URL.
    pub url: String,
    pub identity: ChapterIdentity,
}

/// Errors that abort a series run.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("invalid chapter selection: {0}")]
    Range(#[from] RangeError),

    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a fetch task panicked")]
    TaskPanicked,
}

impl From<RunnerError<FetchError>> for DownloadError {
    fn from(err: RunnerError<FetchError>) -> Self {
        match err {
            RunnerError::Task(e) => DownloadError::Fetch(e),
            RunnerError::Panicked => DownloadError::TaskPanicked,
        }
    }
}

impl DownloadError {
    pub(crate) fn storage(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| DownloadError::Storage { path, source }
    }
}
