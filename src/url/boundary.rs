use crate::config::Config;
use crate::url::normalize::normalize_directory_url;
use crate::UrlError;
use url::Url;

/// A configured crawl root, which is also the prefix bounding its subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootBoundary {
    /// Component name this root was configured for
    pub component: String,

    /// Normalized directory URL of the root
    pub url: Url,
}

impl RootBoundary {
    /// Creates a boundary from a raw root URL, normalizing it
    pub fn new(component: &str, url: &str) -> Result<Self, UrlError> {
        Ok(Self {
            component: component.to_string(),
            url: normalize_directory_url(url)?,
        })
    }

    /// Returns true if `url` is this root or lies below it
    ///
    /// Roots always end with `/`, so a plain string prefix test only matches
    /// on whole path segments.
    pub fn contains(&self, url: &Url) -> bool {
        url.as_str().starts_with(self.url.as_str())
    }
}

/// The set of root boundaries for one crawl
#[derive(Debug, Clone, Default)]
pub struct Boundaries {
    roots: Vec<RootBoundary>,
}

impl Boundaries {
    pub fn new(roots: Vec<RootBoundary>) -> Self {
        Self { roots }
    }

    /// Builds the boundaries from the `[[root]]` entries of a configuration
    pub fn from_config(config: &Config) -> Result<Self, UrlError> {
        let roots = config
            .roots
            .iter()
            .map(|entry| RootBoundary::new(&entry.component, &entry.url))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(roots))
    }

    /// Returns the first root containing `url`, if any
    pub fn root_for(&self, url: &Url) -> Option<&RootBoundary> {
        self.roots.iter().find(|root| root.contains(url))
    }

    /// Returns true if `url` lies within at least one root
    pub fn contains(&self, url: &Url) -> bool {
        self.root_for(url).is_some()
    }

    pub fn roots(&self) -> &[RootBoundary] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
