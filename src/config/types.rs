use serde::Deserialize;

/// Main configuration structure for Shiori
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Title of the work to look for (the CLI may override it)
    #[serde(default)]
    pub title: Option<String>,

    /// Candidate site domains, selected by index
    pub sites: Vec<String>,

    #[serde(default)]
    pub locator: LocatorConfig,

    #[serde(default)]
    pub validator: ValidatorConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub patterns: PatternConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Returns the site domain at `index`
    pub fn site(&self, index: usize) -> Result<&str, crate::ConfigError> {
        self.sites
            .get(index)
            .map(String::as_str)
            .ok_or(crate::ConfigError::UnknownSite {
                index,
                available: self.sites.len(),
            })
    }
}

/// Contents locator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Deepest BFS level examined, counted from the search results page
    #[serde(rename = "max-depth")]
    pub max_depth: u32,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self { max_depth: 3 }
    }
}

/// Contents validator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// A page with more chapter-shaped links than this is a contents page
    #[serde(rename = "chapter-threshold")]
    pub chapter_threshold: usize,

    /// Elements searched for the work title
    #[serde(rename = "title-tags")]
    pub title_tags: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            chapter_threshold: 10,
            title_tags: ["p", "span", "h1", "h2", "h3"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

/// What to do with a chapter that still fails after all retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChapterFailurePolicy {
    /// Stop the run; chapters already written stay on disk
    Abort,
    /// Write the chapter title and a marker line, then continue
    Placeholder,
}

/// Bounded fetch pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of chapter fetches in flight
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: usize,

    /// Text fragments with fewer characters are dropped
    #[serde(rename = "min-fragment-chars")]
    pub min_fragment_chars: usize,

    /// Extra attempts after a failed chapter fetch
    #[serde(rename = "chapter-retries")]
    pub chapter_retries: u32,

    /// Base delay between attempts, multiplied by the attempt number
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    #[serde(rename = "on-chapter-failure")]
    pub on_chapter_failure: ChapterFailurePolicy,

    /// Elements whose text counts as chapter content
    #[serde(rename = "content-tags")]
    pub content_tags: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 50,
            min_fragment_chars: 4,
            chapter_retries: 2,
            retry_backoff_ms: 1000,
            on_chapter_failure: ChapterFailurePolicy::Abort,
            content_tags: ["div", "p", "span", "h1", "h2", "h3"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    pub accept: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Timeout for full page requests (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Timeout for HEAD redirect resolution (seconds)
    #[serde(rename = "resolve-timeout-secs")]
    pub resolve_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/51.0.2704.63 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,*/*".to_string(),
            accept_language: "en-US,en;q=0.8,zh-Hans-CN;q=0.5,zh-Hans;q=0.3".to_string(),
            request_timeout_secs: 30,
            resolve_timeout_secs: 5,
        }
    }
}

/// Search engine used to seed the crawl
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,

    #[serde(rename = "query-param")]
    pub query_param: String,

    /// Selects the result links on the search results page
    #[serde(rename = "result-selector")]
    pub result_selector: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.baidu.com/s".to_string(),
            query_param: "wd".to_string(),
            result_selector: "h3 a[href]".to_string(),
        }
    }
}

/// Text heuristics (regular expressions)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Matches chapter-shaped link text, e.g. "第12章 ..." or "Chapter 12: ..."
    pub chapter: String,

    /// Matches links that lead to a listing, e.g. "目录" or "Contents"
    pub contents: String,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            chapter: r"第?[序一二三四五六七八九十百千0-9]+[章节 ].+|(?i:\bchapter\s*[0-9]+\b.*)"
                .to_string(),
            contents: r"目录|阅读|(?i:contents|\bread\b)".to_string(),
        }
    }
}

/// Output document configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the document is written to
    pub directory: String,

    /// File extension of the document
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            extension: "txt".to_string(),
        }
    }
}
