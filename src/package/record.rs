use crate::package::{FileKind, PackageKey};
use serde::{Deserialize, Serialize};

/// Metadata collected for one package version directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Source package name
    pub package: String,

    /// Version parsed from the version directory ("" when it has no underscore)
    pub version: String,

    /// URL of the `copyright` file, once discovered
    pub copyright_url: Option<String>,

    /// URL of the `changelog` file, once discovered
    pub changelog_url: Option<String>,
}

impl PackageRecord {
    /// Creates an empty record for `key`; both file URLs start absent
    pub fn new(key: &PackageKey) -> Self {
        Self {
            package: key.package.clone(),
            version: key.version().to_string(),
            copyright_url: None,
            changelog_url: None,
        }
    }

    /// Sets the URL field matching `kind`
    pub fn set(&mut self, kind: FileKind, url: &str) {
        let slot = match kind {
            FileKind::Copyright => &mut self.copyright_url,
            FileKind::Changelog => &mut self.changelog_url,
        };
        *slot = Some(url.to_string());
    }

    /// Returns the URL recorded for `kind`
    pub fn get(&self, kind: FileKind) -> Option<&str> {
        match kind {
            FileKind::Copyright => self.copyright_url.as_deref(),
            FileKind::Changelog => self.changelog_url.as_deref(),
        }
    }

    /// True once both well-known files have been found
    pub fn is_complete(&self) -> bool {
        self.copyright_url.is_some() && self.changelog_url.is_some()
    }
}
