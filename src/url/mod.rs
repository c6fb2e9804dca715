//! URL handling module for Shiori
//!
//! This module provides site pattern matching, href resolution and the
//! normalization used to key the visited set.

mod matcher;
mod normalize;

pub use matcher::SitePattern;
pub use normalize::visit_key;

use url::Url;

/// Resolves an anchor href against the page it was found on
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - hrefs carrying `(`, `)`, `<` or `>` (script calls, broken markup)
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    if href.contains(['(', ')', '<', '>']) {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}
