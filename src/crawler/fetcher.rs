//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by the locator, validator and
//! chapter pipeline, including:
//! - Building the HTTP client with browser-like headers
//! - GET requests with content-type classification
//! - Text decoding (header charset, `<meta charset>`, UTF-8 fallback)
//! - HEAD-based redirect resolution with a short timeout

use crate::config::HttpConfig;
use crate::ShioriError;
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Number of leading bytes searched for a `<meta charset>` declaration
const META_SNIFF_BYTES: usize = 1024;

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    /// Name of the encoding the body was decoded with
    pub encoding: &'static str,
    /// Decoded page body
    pub html: String,
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success(FetchedPage),

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, broken body, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Short description of a failed fetch, for logs and error messages
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success(_) => None,
            Self::ContentMismatch { content_type } => {
                Some(format!("expected HTML, got '{}'", content_type))
            }
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed (up to 10 hops) so every response carries the
/// final URL of the page.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, ShioriError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value(&config.accept)?);
    headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()?;
    Ok(client)
}

fn header_value(value: &str) -> Result<HeaderValue, ShioriError> {
    HeaderValue::from_str(value).map_err(|e| {
        crate::ConfigError::Validation(format!("Invalid header value '{}': {}", value, e)).into()
    })
}

/// Fetches a URL and decodes it if it is an HTML page
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with an `html` content type | `Success` |
/// | 2xx with any other content type | `ContentMismatch` |
/// | Non-2xx status | `HttpError` |
/// | Timeout, connection or body error | `NetworkError` |
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return network_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.to_ascii_lowercase().contains("html") {
        return FetchResult::ContentMismatch { content_type };
    }

    match response.bytes().await {
        Ok(body) => {
            let (html, encoding) = decode_body(&body, &content_type);
            FetchResult::Success(FetchedPage {
                final_url,
                encoding: encoding.name(),
                html,
            })
        }
        Err(e) => network_error(e),
    }
}

fn network_error(e: reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    };
    FetchResult::NetworkError { error }
}

/// Resolves a link to the URL it finally lands on
///
/// Sends a HEAD request following redirects. Any failure, including the
/// timeout elapsing, falls back to the unresolved URL.
pub async fn resolve_redirects(client: &Client, url: &Url, timeout: Duration) -> Url {
    match client.head(url.clone()).timeout(timeout).send().await {
        Ok(response) => response.url().clone(),
        Err(e) => {
            tracing::debug!("Could not resolve {}: {}; keeping it as is", url, e);
            url.clone()
        }
    }
}

/// Decodes a page body
///
/// The encoding comes from the Content-Type charset, else from a `<meta>`
/// declaration near the top of the document, else UTF-8. A byte order mark
/// overrides all of them.
pub fn decode_body(body: &[u8], content_type: &str) -> (String, &'static Encoding) {
    let declared = charset_from_content_type(content_type)
        .or_else(|| sniff_meta_charset(body))
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .unwrap_or(UTF_8);

    let (text, used, _had_errors) = declared.decode(body);
    (text.into_owned(), used)
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

/// Finds `charset=...` in the head of the document
///
/// Covers both `<meta charset="gbk">` and
/// `<meta http-equiv="Content-Type" content="text/html; charset=gbk">`.
fn sniff_meta_charset(body: &[u8]) -> Option<String> {
    let head = &body[..body.len().min(META_SNIFF_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(meta_at) = rest.find("<meta") {
        let tag = &rest[meta_at..];
        let tag = &tag[..tag.find('>').unwrap_or(tag.len())];
        if let Some(charset_at) = tag.find("charset=") {
            let value: String = tag[charset_at + "charset=".len()..]
                .trim_start_matches(['"', '\'', ' '])
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
                .collect();
            if !value.is_empty() {
                return Some(value);
            }
        }
        rest = &rest[meta_at + "<meta".len()..];
    }
    None
}
