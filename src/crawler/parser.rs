//! HTML directory listing parser
//!
//! This module turns an autoindex-style listing page into the entries the
//! crawler acts on: subdirectories to recurse into and files to classify.

use crate::url::is_directory_url;
use scraper::{Html, Selector};
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

/// Link text servers use for the link back to the enclosing directory
const PARENT_DIRECTORY_TEXT: &str = "parent directory";

/// Reasons a fetched body cannot be treated as a listing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("Not an HTML listing (Content-Type: {0})")]
    NotHtml(String),

    #[error("Listing body contains binary data")]
    Binary,
}

/// Whether an entry is a subdirectory or a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// One usable link from a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Absolute URL, fragment and query removed
    pub url: Url,
    pub kind: EntryKind,
}

/// Parsed directory listing
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub entries: Vec<ListingEntry>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses a directory listing page
///
/// # Link Extraction Rules
///
/// **Exclude:**
/// - Anchors whose text is `Parent Directory`
/// - Links resolving to the listing itself or one of its ancestors
/// - Sort links (`?C=N;O=D`), fragments, `javascript:` and `mailto:` links
/// - Links that resolve to a non-HTTP(S) URL
/// - Repeated links to the same target
///
/// An entry whose resolved path ends with `/` is a directory; anything else
/// is a file.
///
/// # Arguments
///
/// * `body` - The listing body
/// * `content_type` - Content-Type header, if the server sent one
/// * `base` - URL of the listing, used to resolve relative links
///
/// # Returns
///
/// * `Ok(Listing)` - Parsed listing (possibly empty)
/// * `Err(ListingError)` - The body is not an HTML listing
pub fn parse_listing(
    body: &str,
    content_type: Option<&str>,
    base: &Url,
) -> Result<Listing, ListingError> {
    if let Some(content_type) = content_type {
        let lowered = content_type.to_ascii_lowercase();
        if !lowered.contains("html") {
            return Err(ListingError::NotHtml(content_type.to_string()));
        }
    }

    if body.contains('\0') {
        return Err(ListingError::Binary);
    }

    let document = Html::parse_document(body);
    let mut listing = Listing::default();
    let mut seen = HashSet::new();

    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Ok(listing),
    };

    for element in document.select(&selector) {
        let text = element.text().collect::<String>();
        if text.trim().eq_ignore_ascii_case(PARENT_DIRECTORY_TEXT) {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(url) = resolve_entry(href, base) else {
            continue;
        };

        if is_self_or_ancestor(&url, base) {
            continue;
        }

        if !seen.insert(url.as_str().to_string()) {
            continue;
        }

        let kind = if is_directory_url(&url) {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        listing.entries.push(ListingEntry { url, kind });
    }

    Ok(listing)
}

/// Resolves an href against the listing URL
///
/// Returns None if the link should be excluded
fn resolve_entry(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty()
        || href.starts_with('?')
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    url.set_fragment(None);
    url.set_query(None);
    Some(url)
}

/// True if `candidate` is a directory at or above `base`
fn is_self_or_ancestor(candidate: &Url, base: &Url) -> bool {
    is_directory_url(candidate) && base.as_str().starts_with(candidate.as_str())
}
