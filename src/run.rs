//! One complete run: locate the contents page, list the chapters, capture
//!
//! The document is only created once a contents page with at least one
//! chapter has been found, so a run that ends early leaves nothing on disk.

use crate::capture::{capture_to_file, extract_chapter_list, CaptureReport, ChapterRef};
use crate::crawler::{locate_contents, CrawlContext};
use crate::output::CaptureProgress;
use crate::ShioriError;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use url::Url;

/// How a run should end once the chapter list is known
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Document to write
    pub output: PathBuf,
    /// Stop after listing the chapters
    pub list_only: bool,
    /// Draw the capture progress bar
    pub show_progress: bool,
}

/// What a run produced
#[derive(Debug)]
pub enum RunOutcome {
    /// No contents page within the depth limit
    NotFound,
    /// The contents page lists no chapters
    NoChapters { contents: Url },
    /// `list_only` was set
    Listed {
        contents: Url,
        chapters: Vec<ChapterRef>,
    },
    /// Every chapter was written to `path`
    Captured { path: PathBuf, report: CaptureReport },
}

/// Runs the whole locate and capture sequence for one work
///
/// # Errors
///
/// * `ShioriError::SeedResolution` - The search engine could not be queried
/// * `ShioriError::Cancelled` - `cancel` fired during the search or capture
/// * Any capture error, with the chapters written so far left in place
pub async fn run(
    ctx: &CrawlContext,
    options: &RunOptions,
    cancel: &CancellationToken,
) -> Result<RunOutcome, ShioriError> {
    let located = tokio::select! {
        _ = cancel.cancelled() => return Err(ShioriError::Cancelled),
        located = locate_contents(ctx) => located?,
    };
    let Some(contents) = located else {
        tracing::info!("{} was not found on {}", ctx.title, ctx.site.domain());
        return Ok(RunOutcome::NotFound);
    };
    tracing::info!("Contents page: {}", contents.resolved_url);

    let chapters = extract_chapter_list(&contents, ctx);
    if chapters.is_empty() {
        return Ok(RunOutcome::NoChapters {
            contents: contents.resolved_url,
        });
    }
    tracing::info!("{} chapters listed", chapters.len());

    if options.list_only {
        return Ok(RunOutcome::Listed {
            contents: contents.resolved_url,
            chapters,
        });
    }

    tracing::info!("Capturing to {}", options.output.display());
    let progress = CaptureProgress::for_run(chapters.len(), options.show_progress);
    match capture_to_file(ctx, chapters, &options.output, &progress, cancel).await {
        Ok(report) => {
            progress.finish();
            Ok(RunOutcome::Captured {
                path: options.output.clone(),
                report,
            })
        }
        Err(e) => {
            progress.abandon();
            Err(e)
        }
    }
}
