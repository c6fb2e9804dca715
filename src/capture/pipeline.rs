//! Bounded fetch pipeline
//!
//! Chapters are downloaded by worker tasks while a single writer appends
//! them to the document in list order:
//!
//! - An admission task walks the chapter list and spawns one worker per
//!   chapter, waiting on a semaphore so at most `max-concurrent-fetches`
//!   workers run at a time. A worker returns its permit when it finishes.
//! - Each chapter has its own completion channel. The writer awaits the
//!   channel of chapter `i` before writing it and moving on to `i + 1`, so
//!   chapters that finish early wait in memory until their turn.

use crate::capture::{ChapterContent, ChapterRef};
use crate::config::{ChapterFailurePolicy, PipelineConfig};
use crate::crawler::{extract_text_fragments, fetch_url, FetchResult};
use crate::output::{CaptureProgress, DocumentWriter};
use crate::ShioriError;
use reqwest::Client;
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Semaphore};
use tokio_util::sync::CancellationToken;

/// Outcome of a completed capture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureReport {
    /// Chapter blocks written, placeholders included
    pub chapters_written: usize,
    /// Indices of chapters written as placeholders
    pub placeholders: Vec<usize>,
}

type ChapterOutcome = Result<ChapterContent, ShioriError>;

/// Downloads a chapter page and extracts its readable text
pub async fn fetch_chapter(
    client: &Client,
    chapter: ChapterRef,
    content_tags: &[String],
    min_chars: usize,
) -> ChapterOutcome {
    match fetch_url(client, &chapter.url).await {
        FetchResult::Success(page) => Ok(ChapterContent {
            lines: extract_text_fragments(&page.html, content_tags, min_chars),
            title: chapter.title,
        }),
        failure => Err(ShioriError::ChapterFetch {
            index: chapter.index,
            url: chapter.url.to_string(),
            reason: failure.failure_reason().unwrap_or_default(),
        }),
    }
}

/// Runs the pipeline over `chapters`, writing each one through `writer`
///
/// `loader` downloads a single chapter. Failed loads are retried
/// `chapter-retries` times with a linearly growing pause; a chapter that
/// still fails is handled per `on-chapter-failure`.
///
/// # Errors
///
/// * `ShioriError::Cancelled` - `cancel` fired before every chapter was written
/// * `ShioriError::ChapterFetch` - a chapter failed and the policy is `abort`
/// * `ShioriError::Io` - the document could not be written
pub async fn run_pipeline<L, Fut, W>(
    chapters: Vec<ChapterRef>,
    config: &PipelineConfig,
    loader: L,
    writer: &mut DocumentWriter<W>,
    progress: &CaptureProgress,
    cancel: &CancellationToken,
) -> Result<CaptureReport, ShioriError>
where
    L: Fn(ChapterRef) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ChapterOutcome> + Send + 'static,
    W: Write,
{
    let total = chapters.len();
    let labels: Vec<(String, String)> = chapters
        .iter()
        .map(|c| (c.title.clone(), c.url.to_string()))
        .collect();

    let (senders, receivers): (Vec<_>, Vec<_>) =
        (0..total).map(|_| oneshot::channel::<ChapterOutcome>()).unzip();

    // Stops admission and every running worker once the writer returns
    let jobs = cancel.child_token();
    let _stop_jobs = jobs.clone().drop_guard();

    let retry = RetryPolicy {
        retries: config.chapter_retries,
        backoff: Duration::from_millis(config.retry_backoff_ms),
    };
    tokio::spawn(admit(
        chapters,
        senders,
        Arc::new(Semaphore::new(config.max_concurrent_fetches.max(1))),
        Arc::new(loader),
        retry,
        jobs.clone(),
    ));

    let mut report = CaptureReport::default();
    for (index, receiver) in receivers.into_iter().enumerate() {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => return Err(ShioriError::Cancelled),
            outcome = receiver => outcome,
        };

        let content = match outcome {
            Ok(Ok(content)) => content,
            Ok(Err(ShioriError::Cancelled)) => return Err(ShioriError::Cancelled),
            Ok(Err(e)) => match config.on_chapter_failure {
                ChapterFailurePolicy::Abort => return Err(e),
                ChapterFailurePolicy::Placeholder => {
                    tracing::warn!("{}; writing a placeholder", e);
                    let (title, url) = &labels[index];
                    writer.write_placeholder(title, url)?;
                    report.placeholders.push(index);
                    report.chapters_written += 1;
                    progress.chapter_written();
                    continue;
                }
            },
            // The worker was dropped without reporting
            Err(_) => return Err(ShioriError::Cancelled),
        };

        writer.write_chapter(&content)?;
        report.chapters_written += 1;
        progress.chapter_written();
        tracing::debug!("Wrote chapter {}/{}: {}", index + 1, total, content.title);
    }

    Ok(report)
}

#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    retries: u32,
    backoff: Duration,
}

/// Spawns one worker per chapter, never more than the semaphore allows
async fn admit<L, Fut>(
    chapters: Vec<ChapterRef>,
    senders: Vec<oneshot::Sender<ChapterOutcome>>,
    slots: Arc<Semaphore>,
    loader: Arc<L>,
    retry: RetryPolicy,
    cancel: CancellationToken,
) where
    L: Fn(ChapterRef) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ChapterOutcome> + Send + 'static,
{
    for (chapter, done) in chapters.into_iter().zip(senders) {
        let permit = tokio::select! {
            _ = cancel.cancelled() => return,
            permit = Arc::clone(&slots).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => return,
            },
        };

        let loader = Arc::clone(&loader);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let outcome = load_with_retries(loader.as_ref(), chapter, retry, &cancel).await;
            // The writer may already be gone
            let _ = done.send(outcome);
            drop(permit);
        });
    }
}

async fn load_with_retries<L, Fut>(
    loader: &L,
    chapter: ChapterRef,
    retry: RetryPolicy,
    cancel: &CancellationToken,
) -> ChapterOutcome
where
    L: Fn(ChapterRef) -> Fut,
    Fut: Future<Output = ChapterOutcome>,
{
    let mut attempt = 0;
    loop {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => return Err(ShioriError::Cancelled),
            outcome = loader(chapter.clone()) => outcome,
        };

        match outcome {
            Ok(content) => return Ok(content),
            Err(ShioriError::Cancelled) => return Err(ShioriError::Cancelled),
            Err(e) if attempt < retry.retries => {
                attempt += 1;
                tracing::debug!(
                    "Chapter {} failed ({}), retry {}/{}",
                    chapter.index,
                    e,
                    attempt,
                    retry.retries
                );
                tokio::select! {
                    _ = cancel.cancelled() => return Err(ShioriError::Cancelled),
                    _ = tokio::time::sleep(retry.backoff * attempt) => {}
                }
            }
            Err(e) => return Err(e),
        }
    }
}
