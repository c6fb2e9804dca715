//! Shiori: a serialized-fiction locator and downloader
//!
//! Given a work title and a site domain, this crate searches the site for the
//! page listing every chapter of the work, then downloads the chapters with
//! bounded concurrency and writes them into a single document in their
//! original order.

pub mod capture;
pub mod config;
pub mod crawler;
pub mod output;
pub mod patterns;
pub mod run;
pub mod url;

use thiserror::Error;

/// Main error type for Shiori operations
#[derive(Debug, Error)]
pub enum ShioriError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed resolution failed for query {query:?}: {reason}")]
    SeedResolution { query: String, reason: String },

    #[error("Failed to fetch chapter {index} ({url}): {reason}")]
    ChapterFetch {
        index: usize,
        url: String,
        reason: String,
    },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid regular expression: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid CSS selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Site index {index} out of range ({available} sites configured)")]
    UnknownSite { index: usize, available: usize },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Invalid site domain: {0}")]
    InvalidSite(String),
}

// Re-export commonly used types
pub use capture::{capture_to_file, extract_chapter_list, ChapterContent, ChapterRef};
pub use config::Config;
pub use crawler::{locate_contents, ContentsCandidate, CrawlContext};
pub use run::{run, RunOptions, RunOutcome};
