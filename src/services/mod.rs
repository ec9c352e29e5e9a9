//! Service layer for mangacrawl.
//!
//! Download logic lives here, separate from terminal output, so the CLI only
//! renders [`DownloadEvent`]s.

pub mod download;
pub mod runner;

pub use download::{
    chapter_links, page_filename, ChapterLink, DownloadConfig, DownloadError, DownloadEvent,
    DownloadSummary, SeriesDownloader,
};
pub use runner::{BoundedRunner, Cohort, RunnerError, WorkItem};
