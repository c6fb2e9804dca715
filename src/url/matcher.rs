use crate::UrlError;
use url::Url;

/// A configured target site, matched against link hosts
///
/// Two forms are accepted:
/// 1. Exact: "example.com" matches "example.com" and "www.example.com"
/// 2. Wildcard: "*.example.com" matches "example.com" and any subdomain
///
/// A leading `www.` on either side is ignored, so "www.example.com" and
/// "example.com" name the same site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePattern {
    /// The domain as configured, used for the search query
    domain: String,
    /// Lowercase domain without wildcard or `www.` prefix
    base: String,
    wildcard: bool,
}

impl SitePattern {
    /// Parses a configured site domain
    ///
    /// # Examples
    ///
    /// ```
    /// use shiori::url::SitePattern;
    ///
    /// let site = SitePattern::parse("*.example.com").unwrap();
    /// assert!(site.matches_host("m.example.com"));
    /// assert!(!site.matches_host("example.org"));
    /// ```
    pub fn parse(pattern: &str) -> Result<Self, UrlError> {
        let pattern = pattern.trim();
        let (wildcard, rest) = match pattern.strip_prefix("*.") {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };

        check_domain(rest).map_err(|reason| {
            UrlError::InvalidSite(format!("'{}' {}", pattern, reason))
        })?;

        Ok(Self {
            domain: rest.to_string(),
            base: strip_www(&rest.to_lowercase()).to_string(),
            wildcard,
        })
    }

    /// The site domain without any wildcard prefix
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Checks whether a host belongs to this site
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        let host = strip_www(&host);
        if host == self.base {
            return true;
        }
        self.wildcard
            && host
                .strip_suffix(self.base.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }

    /// Checks whether a URL points into this site
    pub fn matches(&self, url: &Url) -> bool {
        url.host_str().is_some_and(|host| self.matches_host(host))
    }
}

/// Checks a domain (wildcard already removed) label by label
fn check_domain(domain: &str) -> Result<(), &'static str> {
    if domain.is_empty() {
        return Err("has no domain");
    }
    // Schemes, paths and ports are not part of a site
    if domain.contains(['/', ':']) {
        return Err("must be a bare domain, not a URL");
    }

    let labels: Vec<&str> = domain.split('.').collect();
    // "example" alone is a label, not a site
    if labels.len() < 2 {
        return Err("needs at least two labels, e.g. 'example.com'");
    }
    for label in labels {
        if label.is_empty() {
            return Err("has an empty label (leading, trailing or doubled dot)");
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err("has a label starting or ending with '-'");
        }
        // Non-ASCII letters are allowed for internationalized names
        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return Err("contains characters not allowed in a domain");
        }
    }
    Ok(())
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
