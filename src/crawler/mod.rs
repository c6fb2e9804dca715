//! Crawler module for locating a work's contents page
//!
//! This module contains the search side of Shiori, including:
//! - HTTP fetching and redirect resolution
//! - HTML parsing and link extraction
//! - The visited set and breadth-first frontier
//! - Seed resolution through a search engine
//! - Contents page validation and the breadth-first locator

mod fetcher;
mod frontier;
mod locator;
mod parser;
mod seed;
mod validator;

pub use fetcher::{
    build_http_client, decode_body, fetch_url, resolve_redirects, FetchResult, FetchedPage,
};
pub use frontier::{Frontier, FrontierEntry, VisitedSet};
pub use locator::{locate_contents, Locator};
pub use parser::{extract_text_fragments, Anchor, PageDocument, Selectors};
pub use seed::{resolve_seed, search_query};
pub use validator::{
    classify_page, validate_contents, validate_fetched, ContentsCandidate, PageRole, Verdict,
};

use crate::config::{Config, LocatorConfig, PipelineConfig, SearchConfig, ValidatorConfig};
use crate::patterns::Patterns;
use crate::url::SitePattern;
use crate::ShioriError;
use reqwest::Client;
use std::time::Duration;

/// Everything the crawl needs, built once from the configuration
///
/// The context is read-only after construction and is passed explicitly to
/// the seed resolver, locator, validator and chapter pipeline.
#[derive(Debug, Clone)]
pub struct CrawlContext {
    /// Shared HTTP client
    pub client: Client,
    /// Title of the work being searched for
    pub title: String,
    /// Target site
    pub site: SitePattern,
    /// Compiled text heuristics
    pub patterns: Patterns,
    /// Compiled CSS selectors
    pub selectors: Selectors,
    pub locator: LocatorConfig,
    pub validator: ValidatorConfig,
    pub pipeline: PipelineConfig,
    pub search: SearchConfig,
    /// Timeout for HEAD redirect resolution
    pub resolve_timeout: Duration,
}

impl CrawlContext {
    /// Builds the context for one work on one configured site
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `site` - The selected site domain
    /// * `title` - The work title
    pub fn new(config: &Config, site: &str, title: &str) -> Result<Self, ShioriError> {
        Ok(Self {
            client: build_http_client(&config.http)?,
            title: title.trim().to_string(),
            site: SitePattern::parse(site)?,
            patterns: Patterns::new(title, &config.patterns)?,
            selectors: Selectors::new(&config.validator.title_tags, &config.search.result_selector)?,
            locator: config.locator.clone(),
            validator: config.validator.clone(),
            pipeline: config.pipeline.clone(),
            search: config.search.clone(),
            resolve_timeout: Duration::from_secs(config.http.resolve_timeout_secs),
        })
    }
}
