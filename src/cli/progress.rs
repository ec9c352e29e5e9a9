//! Terminal progress for download events.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use mangacrawl::services::DownloadEvent;

fn chapter_bar(directory: &str, pages: usize) -> ProgressBar {
    let pb = ProgressBar::new(pages as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {prefix} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.set_prefix(directory.to_string());
    pb
}

/// Render events until the sender side is dropped.
pub async fn handle_events(mut event_rx: mpsc::Receiver<DownloadEvent>) {
    let mut bar: Option<ProgressBar> = None;

    while let Some(event) = event_rx.recv().await {
        match event {
            DownloadEvent::ChaptersFound { series, count } => {
                println!(
                    "{} {} chapters listed for {}",
                    style("→").cyan(),
                    count,
                    style(series).bold()
                );
            }
            DownloadEvent::ChapterSkipped { directory } => {
                println!("  {} {} (skipped)", style("↷").dim(), directory);
            }
            DownloadEvent::ChapterStarted { directory, pages } => {
                bar = Some(chapter_bar(&directory, pages));
            }
            DownloadEvent::PageWritten { filename, .. } => {
                if let Some(ref pb) = bar {
                    pb.set_message(filename);
                    pb.inc(1);
                }
            }
            DownloadEvent::ChapterCompleted { directory, pages } => {
                if let Some(pb) = bar.take() {
                    pb.finish_and_clear();
                }
                println!("  {} {} ({} pages)", style("✓").green(), directory, pages);
            }
        }
    }

    if let Some(pb) = bar.take() {
        pb.abandon();
    }
}
