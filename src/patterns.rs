//! Text heuristics used to recognise the work's pages
//!
//! Three patterns drive the search:
//! - the title pattern, built from the work title, loosely matches headings
//!   and link texts naming the work
//! - the chapter pattern matches chapter-shaped link texts
//! - the contents pattern matches links that lead to a listing page

use crate::config::PatternConfig;
use crate::ConfigError;
use regex::Regex;

/// Decoration allowed around the title: CJK title brackets, quotes, spaces
const TITLE_OPEN: &str = r#"[《「『“"' ]"#;
const TITLE_CLOSE: &str = r#"[》」』”"' ]"#;

/// Compiled text heuristics for one run
#[derive(Debug, Clone)]
pub struct Patterns {
    title: Regex,
    chapter: Regex,
    contents: Regex,
}

impl Patterns {
    /// Compiles the patterns for a work title
    pub fn new(title: &str, config: &PatternConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            title: Regex::new(&title_pattern(title))?,
            chapter: Regex::new(&config.chapter)?,
            contents: Regex::new(&config.contents)?,
        })
    }

    /// True if the text starts with the title, optionally decorated
    pub fn matches_title(&self, text: &str) -> bool {
        self.title.is_match(text.trim())
    }

    /// True if the text looks like a chapter heading
    pub fn matches_chapter(&self, text: &str) -> bool {
        self.chapter.is_match(text.trim())
    }

    /// True if the text names a listing ("contents", "read", ...)
    pub fn matches_contents(&self, text: &str) -> bool {
        self.contents.is_match(text.trim())
    }
}

/// Builds the loose title regex: `^<open>?<title><close>?`
pub fn title_pattern(title: &str) -> String {
    format!(
        "^{}?{}{}?",
        TITLE_OPEN,
        regex::escape(title.trim()),
        TITLE_CLOSE
    )
}
