use url::Url;

/// Query parameters that never change which page is served
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
    "from",
];

/// Builds the visited-set key for a URL
///
/// Two links that serve the same page should produce the same key:
///
/// 1. Lowercase the host and drop a `www.` prefix
/// 2. Drop the fragment
/// 3. Remove the trailing slash of non-root paths
/// 4. Remove tracking query parameters, sort the rest
///
/// The scheme and port are kept, so `http` and `https` pages stay distinct.
///
/// # Examples
///
/// ```
/// use shiori::url::visit_key;
/// use url::Url;
///
/// let a = Url::parse("https://WWW.example.com/book/1/#top").unwrap();
/// let b = Url::parse("https://example.com/book/1").unwrap();
/// assert_eq!(visit_key(&a), visit_key(&b));
/// ```
pub fn visit_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);

    if let Some(host) = url.host_str() {
        let host = host.to_lowercase();
        if let Some(bare) = host.strip_prefix("www.") {
            // set_host only fails for cannot-be-a-base URLs, which have no host
            let _ = key.set_host(Some(bare));
        }
    }

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        key.set_path(path.trim_end_matches('/'));
    }

    if key.query().is_some() {
        let params = filter_and_sort_query_params(&key);
        if params.is_empty() {
            key.set_query(None);
        } else {
            key.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    key.into()
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort();
    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
