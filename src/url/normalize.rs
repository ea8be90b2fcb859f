use crate::UrlError;
use url::Url;

/// Normalizes a directory URL so that equivalent spellings compare equal
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an `http` or `https` scheme and a host
/// 3. Lowercase the host (done by the parser)
/// 4. Normalize the path:
///    - Remove dot segments (. and ..)
///    - Collapse repeated slashes
///    - Always end with a trailing slash
/// 5. Remove fragment and query string
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized directory URL
/// * `Err(UrlError)` - Failed to parse or normalize the URL
///
/// # Examples
///
/// ```
/// use pool_indexer::url::normalize_directory_url;
///
/// let url = normalize_directory_url("https://EXAMPLE.com/pool//main").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/pool/main/");
/// ```
pub fn normalize_directory_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    to_directory_url(url)
}

/// Normalizes an already-parsed URL into its directory form
pub fn to_directory_url(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    if url.cannot_be_a_base() {
        return Err(UrlError::CannotBeABase(url.to_string()));
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);
    url.set_fragment(None);
    url.set_query(None);

    Ok(url)
}

/// Normalizes a URL path into `/a/b/c/` form
fn normalize_path(path: &str) -> String {
    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    if normalized_segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}/", normalized_segments.join("/"))
}
