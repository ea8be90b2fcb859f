//! URL handling module for Pool-Indexer
//!
//! This module provides directory URL normalization and the root boundary
//! checks that keep the crawl inside its configured components.

mod boundary;
mod normalize;

pub use boundary::{Boundaries, RootBoundary};
pub use normalize::{normalize_directory_url, to_directory_url};

use url::Url;

/// Returns the last non-empty path segment of `url`, lowercased
///
/// Used to match listing entries against the well-known filenames.
pub fn lowercase_basename(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(|segment| segment.to_lowercase())
}

/// Returns true if the URL path denotes a directory (ends with `/`)
pub fn is_directory_url(url: &Url) -> bool {
    url.path().ends_with('/')
}
