//! Capture module: from a confirmed contents page to the finished document
//!
//! - Chapter list extraction from the contents page
//! - The bounded fetch pipeline that downloads chapters concurrently and
//!   hands them to the document writer in list order

mod pipeline;

pub use pipeline::{fetch_chapter, run_pipeline, CaptureReport};

use crate::crawler::{ContentsCandidate, CrawlContext, PageDocument};
use crate::output::{CaptureProgress, DocumentWriter};
use crate::ShioriError;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// One entry of the chapter list
///
/// `index` is the chapter's position in the list and fixes its place in the
/// output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRef {
    pub index: usize,
    pub title: String,
    pub url: Url,
}

/// The readable text of a downloaded chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterContent {
    pub title: String,
    /// Text fragments in document order
    pub lines: Vec<String>,
}

/// Lists the chapters linked from the contents page, in document order
///
/// Every same-site anchor whose text looks like a chapter heading is kept,
/// with its href resolved against the contents page's final URL.
pub fn extract_chapter_list(contents: &ContentsCandidate, ctx: &CrawlContext) -> Vec<ChapterRef> {
    let page = PageDocument::parse(&contents.html, contents.resolved_url.clone());
    page.site_anchors(&ctx.selectors, &ctx.site)
        .filter(|anchor| ctx.patterns.matches_chapter(&anchor.text))
        .enumerate()
        .map(|(index, anchor)| ChapterRef {
            index,
            title: anchor.text,
            url: anchor.href,
        })
        .collect()
}

/// Downloads every chapter into the document at `path`
///
/// The document is created before the first chapter arrives; on failure or
/// cancellation it keeps the chapters written so far.
pub async fn capture_to_file(
    ctx: &CrawlContext,
    chapters: Vec<ChapterRef>,
    path: &Path,
    progress: &CaptureProgress,
    cancel: &CancellationToken,
) -> Result<CaptureReport, ShioriError> {
    let mut writer = DocumentWriter::create(path)?;

    let client = ctx.client.clone();
    let content_tags: Arc<[String]> = ctx.pipeline.content_tags.clone().into();
    let min_chars = ctx.pipeline.min_fragment_chars;
    let loader = move |chapter: ChapterRef| {
        let client = client.clone();
        let content_tags = Arc::clone(&content_tags);
        async move { fetch_chapter(&client, chapter, &content_tags, min_chars).await }
    };

    run_pipeline(chapters, &ctx.pipeline, loader, &mut writer, progress, cancel).await
}
