//! CLI parser and command dispatch.

mod download;
mod list;
mod progress;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use mangacrawl::config::{Config, SeriesConfig};
use mangacrawl::models::ChapterRanges;

#[derive(Parser)]
#[command(name = "mangacrawl")]
#[command(about = "Download web comic chapters into a sorted directory tree")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output directory holding one folder per series (overrides config)
    #[arg(short, long, global = true, env = "MANGACRAWL_OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Download every chapter not already on disk
    Download {
        #[command(flatten)]
        target: SeriesArgs,
    },

    /// Show the chapters that would be downloaded or skipped
    List {
        #[command(flatten)]
        target: SeriesArgs,
    },
}

/// Which series to operate on.
#[derive(Args)]
struct SeriesArgs {
    /// Configured series by directory name or title (default: all, in config order)
    series: Vec<String>,

    /// Ad-hoc series root URL instead of a configured series
    #[arg(long, requires = "title", conflicts_with = "series")]
    url: Option<String>,

    /// Series title as it appears in chapter links (with --url)
    #[arg(long, requires = "url")]
    title: Option<String>,

    /// Directory name for an ad-hoc series (default: the title)
    #[arg(long, requires = "url")]
    directory: Option<String>,

    /// Only these chapters, e.g. "1..10,12"
    #[arg(long)]
    chapters: Option<String>,
}

impl SeriesArgs {
    fn resolve(&self, config: &Config) -> anyhow::Result<Vec<SeriesConfig>> {
        let mut selected: Vec<SeriesConfig> = match (&self.url, &self.title) {
            (Some(url), Some(title)) => {
                let directory = self.directory.clone().unwrap_or_else(|| title.clone());
                vec![SeriesConfig::new(url, title, directory)]
            }
            _ => {
                for name in &self.series {
                    if !config.series.iter().any(|s| s.matches(name)) {
                        bail!("No configured series named {:?}", name);
                    }
                }
                config
                    .select_series(&self.series)
                    .into_iter()
                    .cloned()
                    .collect()
            }
        };

        if let Some(chapters) = &self.chapters {
            chapters
                .parse::<ChapterRanges>()
                .with_context(|| format!("Invalid --chapters {:?}", chapters))?;
            for series in &mut selected {
                series.chapters = Some(chapters.clone());
            }
        }

        if selected.is_empty() {
            bail!("No series configured; pass --url and --title or add [[series]] to the config");
        }
        Ok(selected)
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .await
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Loading {}", path.display()))?,
        None => Config::load().await,
    };
    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| config.resolved_output_dir());

    match cli.command {
        Commands::Download { target } => {
            let series = target.resolve(&config)?;
            download::cmd_download(&config, &output_dir, &series).await
        }
        Commands::List { target } => {
            let series = target.resolve(&config)?;
            list::cmd_list(&config, &output_dir, &series).await
        }
    }
}
