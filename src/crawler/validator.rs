//! Contents page validation
//!
//! Decides what role a candidate page plays for the work:
//! - the contents page itself (enough chapter-shaped links)
//! - a description page that links onward to the contents page
//! - something unrelated
//!
//! Description pages are followed through their "contents" link until a
//! contents page is found, a page turns out unrelated, or the link leads
//! back into the visited set.

use crate::crawler::fetcher::{fetch_url, FetchResult, FetchedPage};
use crate::crawler::frontier::VisitedSet;
use crate::crawler::parser::PageDocument;
use crate::crawler::CrawlContext;
use url::Url;

/// The confirmed contents page of the work
#[derive(Debug, Clone)]
pub struct ContentsCandidate {
    /// URL the validator was pointed at
    pub url: Url,
    /// Final URL after redirects; chapter links resolve against it
    pub resolved_url: Url,
    /// Raw document
    pub html: String,
}

/// Role of a page with respect to the work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRole {
    /// The page lists the chapters
    Contents,
    /// The page is about the work and links to its listing
    Description { contents_link: Url },
    /// The page does not belong to the work
    Unrelated,
}

/// Classifies a parsed page
///
/// 1. Without a title-level element naming the work, the page is unrelated.
/// 2. With more same-site chapter-shaped links than the configured
///    threshold, it is the contents page.
/// 3. Otherwise the first same-site link whose text names a listing makes
///    it a description page.
pub fn classify_page(page: &PageDocument, ctx: &CrawlContext) -> PageRole {
    if !page.has_title_element(&ctx.selectors, &ctx.patterns) {
        return PageRole::Unrelated;
    }

    let mut chapter_links = 0usize;
    let mut contents_link = None;
    for anchor in page.site_anchors(&ctx.selectors, &ctx.site) {
        if ctx.patterns.matches_chapter(&anchor.text) {
            chapter_links += 1;
            if chapter_links > ctx.validator.chapter_threshold {
                return PageRole::Contents;
            }
        }
        if contents_link.is_none() && ctx.patterns.matches_contents(&anchor.text) {
            contents_link = Some(anchor.href);
        }
    }

    match contents_link {
        Some(contents_link) => PageRole::Description { contents_link },
        None => PageRole::Unrelated,
    }
}

fn classify_html(html: &str, url: &Url, ctx: &CrawlContext) -> PageRole {
    let page = PageDocument::parse(html, url.clone());
    classify_page(&page, ctx)
}

/// Checks whether `url` leads to the contents page of the work
///
/// `url` itself is recorded in `visited`; every description-page hop is
/// recorded before it is fetched, so no page is fetched twice and cycles
/// between description pages end the walk.
///
/// # Returns
///
/// * `Some(ContentsCandidate)` - The contents page was found
/// * `None` - The page is unrelated, not HTML, unreachable, or leads back
///   into already visited pages
pub async fn validate_contents(
    ctx: &CrawlContext,
    visited: &mut VisitedSet,
    url: Url,
) -> Option<ContentsCandidate> {
    visited.insert(&url);
    let page = fetch_candidate(ctx, &url).await?;
    match validate_fetched(ctx, visited, url, page).await {
        Verdict::Contents(found) => Some(found),
        Verdict::Rejected | Verdict::SeenBefore(_) => None,
    }
}

/// Where a validation walk ended
#[derive(Debug)]
pub enum Verdict {
    /// The contents page was found
    Contents(ContentsCandidate),
    /// A description page pointed at a URL already in the visited set
    SeenBefore(Url),
    /// The page is unrelated or could not be fetched
    Rejected,
}

/// Same walk as [`validate_contents`], starting from a page already in hand
///
/// The locator uses this for pages it fetched itself, so that a page
/// reached both as a frontier entry and through a title link is requested
/// only once. A hop into the visited set is reported rather than dropped,
/// since the locator may still have that page queued.
pub async fn validate_fetched(
    ctx: &CrawlContext,
    visited: &mut VisitedSet,
    url: Url,
    page: FetchedPage,
) -> Verdict {
    let mut current = url;
    let mut page = page;

    loop {
        visited.insert(&page.final_url);

        let contents_link = match classify_html(&page.html, &page.final_url, ctx) {
            PageRole::Contents => {
                tracing::info!("Contents page confirmed: {}", page.final_url);
                return Verdict::Contents(ContentsCandidate {
                    url: current,
                    resolved_url: page.final_url,
                    html: page.html,
                });
            }
            PageRole::Description { contents_link } => contents_link,
            PageRole::Unrelated => {
                tracing::debug!("{} is not related to the work", page.final_url);
                return Verdict::Rejected;
            }
        };

        if !visited.insert(&contents_link) {
            tracing::debug!(
                "{} points to {}, which was already visited",
                page.final_url,
                contents_link
            );
            return Verdict::SeenBefore(contents_link);
        }
        tracing::debug!(
            "{} is a description page, following {}",
            page.final_url,
            contents_link
        );
        page = match fetch_candidate(ctx, &contents_link).await {
            Some(page) => page,
            None => return Verdict::Rejected,
        };
        current = contents_link;
    }
}

pub(crate) async fn fetch_candidate(ctx: &CrawlContext, url: &Url) -> Option<FetchedPage> {
    tracing::debug!("Validating {}", url);
    match fetch_url(&ctx.client, url).await {
        FetchResult::Success(page) => Some(page),
        failure => {
            tracing::debug!(
                "Skipping candidate {}: {}",
                url,
                failure.failure_reason().unwrap_or_default()
            );
            None
        }
    }
}
