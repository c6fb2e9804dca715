//! Breadth-first search for the contents page
//!
//! The search starts from the search engine's results page. Result links
//! whose text names the work go straight to the validator; every same-site
//! result the validator did not accept forms depth 1 of the frontier. Each frontier page is
//! scanned the same way, one depth level at a time, until the validator
//! confirms a contents page or the depth limit is reached.

use crate::crawler::fetcher::{fetch_url, resolve_redirects, FetchResult, FetchedPage};
use crate::crawler::frontier::{Frontier, VisitedSet};
use crate::crawler::parser::{Anchor, PageDocument};
use crate::crawler::seed::{resolve_seed, search_query};
use crate::crawler::validator::{
    classify_page, fetch_candidate, validate_fetched, ContentsCandidate, PageRole, Verdict,
};
use crate::crawler::CrawlContext;
use crate::url::visit_key;
use crate::ShioriError;
use std::collections::HashMap;
use url::Url;

/// One search for the contents page of a work
///
/// Owns the visited set for the whole traversal; the validator borrows it
/// for each candidate. Queueing a page and validating it are tracked
/// apart: a page first reached through an ordinary link is still validated
/// when a title link points at it later.
pub struct Locator<'a> {
    ctx: &'a CrawlContext,
    /// Pages queued, fetched or walked by the validator
    visited: VisitedSet,
    /// Title-link targets handed to the validator
    validated: VisitedSet,
    /// Title-link targets still waiting in the frontier
    awaiting: VisitedSet,
    /// Fetched pages kept for a later role, keyed by visit key
    held: HashMap<String, FetchedPage>,
}

impl<'a> Locator<'a> {
    pub fn new(ctx: &'a CrawlContext) -> Self {
        Self {
            ctx,
            visited: VisitedSet::new(),
            validated: VisitedSet::new(),
            awaiting: VisitedSet::new(),
            held: HashMap::new(),
        }
    }

    /// URLs examined so far
    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Runs the search from a resolved seed URL
    ///
    /// # Returns
    ///
    /// * `Ok(Some(candidate))` - The contents page was found
    /// * `Ok(None)` - The frontier was exhausted within the depth limit
    /// * `Err(ShioriError::SeedResolution)` - The seed page could not be fetched
    pub async fn locate(&mut self, seed: Url) -> Result<Option<ContentsCandidate>, ShioriError> {
        let ctx = self.ctx;
        tracing::info!("depth: 0 analyzing <-- {}", seed);
        self.visited.insert(&seed);

        let seed_page = match fetch_url(&ctx.client, &seed).await {
            FetchResult::Success(page) => page,
            failure => {
                return Err(ShioriError::SeedResolution {
                    query: search_query(&ctx.title, ctx.site.domain()),
                    reason: failure.failure_reason().unwrap_or_default(),
                })
            }
        };
        self.visited.insert(&seed_page.final_url);

        let results = search_results(&seed_page.html, &seed_page.final_url, ctx);
        tracing::debug!("{} result links on the seed page", results.len());

        let mut first_level = Vec::new();
        let mut queued = VisitedSet::new();
        for anchor in results {
            let target = resolve_redirects(&ctx.client, &anchor.href, ctx.resolve_timeout).await;
            let on_site = ctx.site.matches(&target);

            if ctx.patterns.matches_title(&anchor.text) {
                if let Some(found) = self.validate(target.clone(), on_site).await {
                    return Ok(Some(found));
                }
                // A rejected hit is still expanded, from the copy the validator fetched
                if self.held.contains_key(&visit_key(&target)) && queued.insert(&target) {
                    tracing::debug!("appending to queue --> {}", target);
                    first_level.push(target);
                }
            } else if on_site && self.visited.insert(&target) && queued.insert(&target) {
                tracing::debug!("appending to queue --> {}", target);
                first_level.push(target);
            }
        }

        let max_depth = ctx.locator.max_depth;
        let mut frontier = Frontier::new(first_level);

        while let Some((depth, url)) = frontier.pop() {
            if depth > max_depth {
                break;
            }
            tracing::info!("depth: {} analyzing <-- {}", depth, url);

            let key = visit_key(&url);
            let page = match self.held.remove(&key) {
                Some(page) => page,
                None => match fetch_url(&ctx.client, &url).await {
                    FetchResult::Success(page) => page,
                    failure => {
                        tracing::debug!(
                            "Skipping {}: {}",
                            url,
                            failure.failure_reason().unwrap_or_default()
                        );
                        continue;
                    }
                },
            };
            tracing::debug!("{} decoded as {}", page.final_url, page.encoding);
            self.visited.insert(&page.final_url);

            if self.awaiting.contains(&url) {
                if let Some(found) = self.walk(url.clone(), page.clone()).await {
                    return Ok(Some(found));
                }
            }

            let (anchors, names_work) = scan_page(&page.html, &page.final_url, ctx);
            if names_work && !self.validated.contains(&url) {
                self.held.insert(key, page);
            }

            for anchor in anchors {
                if ctx.patterns.matches_title(&anchor.text) {
                    if let Some(found) = self.validate(anchor.href, false).await {
                        return Ok(Some(found));
                    }
                } else if depth < max_depth && self.visited.insert(&anchor.href) {
                    tracing::debug!("appending to queue --> {}", anchor.href);
                    frontier.push(anchor.href);
                }
            }
        }

        tracing::info!(
            "Search exhausted after examining {} pages",
            self.visited.len()
        );
        Ok(None)
    }

    /// Hands a title-matching link to the validator, once per URL
    ///
    /// A page the frontier already fetched is validated from that copy; one
    /// still queued is validated when its turn comes. With `keep`, a freshly
    /// fetched page that fails validation is held for expansion.
    async fn validate(&mut self, url: Url, keep: bool) -> Option<ContentsCandidate> {
        if !self.validated.insert(&url) {
            return None;
        }
        let ctx = self.ctx;
        let key = visit_key(&url);

        if let Some(page) = self.held.remove(&key) {
            return self.walk(url, page).await;
        }
        if !self.visited.insert(&url) {
            self.awaiting.insert(&url);
            return None;
        }

        let page = fetch_candidate(ctx, &url).await?;
        let kept = keep.then(|| page.clone());
        let found = self.walk(url, page).await;
        if found.is_none() {
            if let Some(page) = kept {
                self.held.insert(key, page);
            }
        }
        found
    }

    /// Runs the validator from a fetched page
    ///
    /// When a description page points at a page the frontier has already
    /// claimed, the walk continues from the held copy, or resumes once the
    /// frontier fetches it.
    async fn walk(&mut self, url: Url, page: FetchedPage) -> Option<ContentsCandidate> {
        let (mut url, mut page) = (url, page);
        loop {
            match validate_fetched(self.ctx, &mut self.visited, url, page).await {
                Verdict::Contents(found) => return Some(found),
                Verdict::Rejected => return None,
                Verdict::SeenBefore(link) => {
                    if !self.validated.insert(&link) {
                        return None;
                    }
                    match self.held.remove(&visit_key(&link)) {
                        Some(held) => {
                            url = link;
                            page = held;
                        }
                        None => {
                            self.awaiting.insert(&link);
                            return None;
                        }
                    }
                }
            }
        }
    }
}

// Parsed documents are not Send, so they never outlive these helpers.

fn search_results(html: &str, url: &Url, ctx: &CrawlContext) -> Vec<Anchor> {
    let page = PageDocument::parse(html, url.clone());
    page.search_results(&ctx.selectors).collect()
}

/// Same-site anchors of a frontier page, and whether the page is about the work
fn scan_page(html: &str, url: &Url, ctx: &CrawlContext) -> (Vec<Anchor>, bool) {
    let page = PageDocument::parse(html, url.clone());
    let names_work = classify_page(&page, ctx) != PageRole::Unrelated;
    (page.site_anchors(&ctx.selectors, &ctx.site).collect(), names_work)
}

/// Resolves the seed through the search engine and searches from it
pub async fn locate_contents(ctx: &CrawlContext) -> Result<Option<ContentsCandidate>, ShioriError> {
    let seed = resolve_seed(ctx).await?;
    Locator::new(ctx).locate(seed).await
}
