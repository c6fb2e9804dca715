//! Seed resolution through a search engine
//!
//! The crawl starts from the search engine's results page for
//! `"<title> site:<domain>"`. Without it nothing else can run, so every
//! failure here is fatal.

use crate::crawler::CrawlContext;
use crate::ShioriError;
use url::Url;

/// Builds the site-restricted search query
pub fn search_query(title: &str, site_domain: &str) -> String {
    format!("{} site:{}", title, site_domain)
}

/// Resolves the search results URL that seeds the crawl
///
/// Sends a HEAD request for the query and follows redirects; the landing URL
/// is the seed.
pub async fn resolve_seed(ctx: &CrawlContext) -> Result<Url, ShioriError> {
    let query = search_query(&ctx.title, ctx.site.domain());
    tracing::debug!("Searching {} for {:?}", ctx.search.endpoint, query);

    let response = ctx
        .client
        .head(ctx.search.endpoint.as_str())
        .query(&[(ctx.search.query_param.as_str(), query.as_str())])
        .send()
        .await
        .map_err(|e| ShioriError::SeedResolution {
            query: query.clone(),
            reason: e.to_string(),
        })?;

    Ok(response.url().clone())
}
