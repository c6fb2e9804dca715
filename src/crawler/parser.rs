//! HTML parser for extracting links and chapter text
//!
//! This module wraps `scraper` behind a small page handle exposing what the
//! crawl needs from a document:
//! - anchors (text + resolved href), optionally restricted to the target site
//! - whether a heading-level element names the work
//! - the readable text fragments of a chapter page

use crate::patterns::Patterns;
use crate::url::{resolve_href, SitePattern};
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements whose text is never chapter content
const STRIPPED_TAGS: &[&str] = &["script", "style", "noscript", "a"];

/// An anchor element with its visible text and resolved target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Visible link text, trimmed
    pub text: String,
    /// Absolute link target
    pub href: Url,
}

/// Selectors compiled once per run
#[derive(Debug, Clone)]
pub struct Selectors {
    anchors: Selector,
    title_elements: Selector,
    search_results: Selector,
}

impl Selectors {
    /// Compiles the selectors used by the locator and validator
    ///
    /// # Arguments
    ///
    /// * `title_tags` - Element names searched for the work title
    /// * `result_selector` - Selector for result links on the search page
    pub fn new(title_tags: &[String], result_selector: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            anchors: compile("a[href]")?,
            title_elements: compile(&title_tags.join(", "))?,
            search_results: compile(result_selector)?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// A parsed HTML page together with the URL its links resolve against
pub struct PageDocument {
    html: Html,
    url: Url,
}

impl PageDocument {
    /// Parses a document; `url` should be the final URL after redirects
    ///
    /// # Example
    ///
    /// ```
    /// use shiori::crawler::{PageDocument, Selectors};
    /// use url::Url;
    ///
    /// let selectors = Selectors::new(&["h1".to_string()], "h3 a[href]").unwrap();
    /// let html = r#"<p>Prologue</p><a href="/c/1">Chapter 1: Start</a>"#;
    /// let page = PageDocument::parse(html, Url::parse("https://example.com/b/").unwrap());
    /// let anchors: Vec<_> = page.anchors(&selectors).collect();
    /// assert_eq!(anchors[0].href.as_str(), "https://example.com/c/1");
    /// ```
    pub fn parse(source: &str, url: Url) -> Self {
        Self {
            html: Html::parse_document(source),
            url,
        }
    }

    /// Lazily yields anchors matched by `selector`, in document order
    fn anchors_matching<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = Anchor> + 'a {
        self.html.select(selector).filter_map(move |element| {
            if element.value().attr("download").is_some() {
                return None;
            }
            let href = resolve_href(element.value().attr("href")?, &self.url)?;
            Some(Anchor {
                text: element_text(&element),
                href,
            })
        })
    }

    /// Lazily yields every anchor, in document order
    pub fn anchors<'a>(&'a self, selectors: &'a Selectors) -> impl Iterator<Item = Anchor> + 'a {
        self.anchors_matching(&selectors.anchors)
    }

    /// Lazily yields anchors whose target lies within `site`
    pub fn site_anchors<'a>(
        &'a self,
        selectors: &'a Selectors,
        site: &'a SitePattern,
    ) -> impl Iterator<Item = Anchor> + 'a {
        self.anchors(selectors)
            .filter(move |anchor| site.matches(&anchor.href))
    }

    /// Lazily yields the result links of a search results page
    pub fn search_results<'a>(
        &'a self,
        selectors: &'a Selectors,
    ) -> impl Iterator<Item = Anchor> + 'a {
        self.anchors_matching(&selectors.search_results)
    }

    /// True if a title-level element's text matches the work title
    pub fn has_title_element(&self, selectors: &Selectors, patterns: &Patterns) -> bool {
        self.html
            .select(&selectors.title_elements)
            .any(|element| patterns.matches_title(&element_text(&element)))
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extracts the readable text of a chapter page
///
/// A text node is kept when it sits inside one of `content_tags` and not
/// inside `script`, `style`, `noscript` or an anchor. Fragments are trimmed;
/// those with fewer than `min_chars` characters are dropped.
pub fn extract_text_fragments(html: &str, content_tags: &[String], min_chars: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut fragments = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let fragment = text.trim();
        if fragment.is_empty() || fragment.chars().count() < min_chars {
            continue;
        }

        let mut in_content = false;
        let mut stripped = false;
        for ancestor in node.ancestors() {
            let Some(element) = ancestor.value().as_element() else {
                continue;
            };
            let name = element.name();
            if STRIPPED_TAGS.contains(&name) {
                stripped = true;
                break;
            }
            if content_tags.iter().any(|tag| tag.eq_ignore_ascii_case(name)) {
                in_content = true;
            }
        }

        if in_content && !stripped {
            fragments.push(fragment.to_string());
        }
    }

    fragments
}
