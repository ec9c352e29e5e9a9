//! Configuration management for mangacrawl using the prefer crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{ChapterRanges, RangeError};
use crate::scrapers::HttpClientConfig;
use crate::services::DownloadConfig;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 100;
/// Default number of retries after a connect or timeout failure.
pub const DEFAULT_RETRIES: u32 = 10;
/// Default concurrency cap for chapter page fetches.
pub const DEFAULT_CHAPTER_CONCURRENCY: usize = 100;
/// Default concurrency cap for image fetches within one chapter.
pub const DEFAULT_IMAGE_CONCURRENCY: usize = 20;

/// One series to crawl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Root page listing the series' chapters.
    pub url: String,
    /// Series title as it appears in chapter link text.
    pub title: String,
    /// Directory name under `output_dir`.
    pub directory: String,
    /// Optional chapter selection, e.g. `1..10,12`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapters: Option<String>,
    /// CSS selector for chapter links on the root page.
    #[serde(default = "default_chapter_selector")]
    pub chapter_selector: String,
    /// CSS selector for page images on a chapter page.
    #[serde(default = "default_image_selector")]
    pub image_selector: String,
}

fn default_chapter_selector() -> String {
    "main a".to_string()
}

fn default_image_selector() -> String {
    "img".to_string()
}

impl SeriesConfig {
    /// Series with default selectors and no chapter filter.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        directory: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            directory: directory.into(),
            chapters: None,
            chapter_selector: default_chapter_selector(),
            image_selector: default_image_selector(),
        }
    }

    /// Parse the `chapters` expression, if any.
    pub fn chapter_ranges(&self) -> Result<Option<ChapterRanges>, RangeError> {
        self.chapters
            .as_deref()
            .map(str::parse::<ChapterRanges>)
            .transpose()
    }

    /// Match a CLI selector against directory name or title (case-insensitive).
    pub fn matches(&self, name: &str) -> bool {
        self.directory == name || self.title.to_lowercase() == name.to_lowercase()
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory that holds one subdirectory per series.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Retries after a connect or timeout failure.
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Delay between retries in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_chapter_concurrency")]
    pub chapter_concurrency: usize,
    #[serde(default = "default_image_concurrency")]
    pub image_concurrency: usize,
    /// User agent string, or "impersonate" for a browser user agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Series to crawl, in order.
    #[serde(default)]
    pub series: Vec<SeriesConfig>,
    /// Where this config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_chapter_concurrency() -> usize {
    DEFAULT_CHAPTER_CONCURRENCY
}

fn default_image_concurrency() -> usize {
    DEFAULT_IMAGE_CONCURRENCY
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            request_timeout: default_request_timeout(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            chapter_concurrency: default_chapter_concurrency(),
            image_concurrency: default_image_concurrency(),
            user_agent: None,
            series: Vec::new(),
            source_path: None,
        }
    }
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Falls back to defaults when no config file is found.
    pub async fn load() -> Self {
        match prefer::load("mangacrawl").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            warn!("Ignoring config {}: {}", path.display(), e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => {
                debug!("No mangacrawl config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse config text in the format named by `ext`.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        let config: Config = match ext {
            "json" => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => toml::from_str(contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject chapter expressions that do not parse.
    pub fn validate(&self) -> Result<(), String> {
        for series in &self.series {
            series
                .chapter_ranges()
                .map_err(|e| format!("series {:?}: {}", series.title, e))?;
        }
        Ok(())
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Output directory, resolved against the config file location when relative.
    pub fn resolved_output_dir(&self) -> PathBuf {
        if self.output_dir.is_absolute() {
            return self.output_dir.clone();
        }
        match self.base_dir() {
            Some(base) => base.join(&self.output_dir),
            None => self.output_dir.clone(),
        }
    }

    /// Series matching any of `names`, in config order. Empty `names` selects all.
    pub fn select_series(&self, names: &[String]) -> Vec<&SeriesConfig> {
        self.series
            .iter()
            .filter(|s| names.is_empty() || names.iter().any(|n| s.matches(n)))
            .collect()
    }

    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: Duration::from_secs(self.request_timeout),
            retries: self.retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig {
            chapter_concurrency: self.chapter_concurrency,
            image_concurrency: self.image_concurrency,
        }
    }
}
