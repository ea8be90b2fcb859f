use std::fmt;
use url::Url;

/// Lowercase basenames the crawl collects from version directories
pub const WELL_KNOWN_FILES: [&str; 2] = ["copyright", "changelog"];

/// Which well-known file a URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Copyright,
    Changelog,
}

impl FileKind {
    /// Classifies a basename, ignoring case
    pub fn from_filename(name: &str) -> Option<Self> {
        let lowered = name.to_ascii_lowercase();
        let known = WELL_KNOWN_FILES.iter().find(|known| **known == lowered)?;
        match *known {
            "copyright" => Some(Self::Copyright),
            "changelog" => Some(Self::Changelog),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Copyright => "copyright",
            Self::Changelog => "changelog",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured identity of one package version directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageKey {
    /// Archive component, e.g. "main"
    pub component: String,

    /// Alphabetical bucket, e.g. "l" or "libx"
    pub bucket: String,

    /// Source package name
    pub package: String,

    /// Version directory name, e.g. "libx_1.0-2"
    pub version_dir: String,
}

impl PackageKey {
    /// Version parsed from the version directory
    pub fn version(&self) -> &str {
        parse_version(&self.version_dir)
    }

    /// The `component/bucket/package/version_dir` path identifying this key
    pub fn path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.component, self.bucket, self.package, self.version_dir
        )
    }
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Returns the text after the first underscore of a version directory
///
/// # Examples
///
/// ```
/// use pool_indexer::package::parse_version;
///
/// assert_eq!(parse_version("foo_1.2.3-1ubuntu2"), "1.2.3-1ubuntu2");
/// assert_eq!(parse_version("foo"), "");
/// ```
pub fn parse_version(version_dir: &str) -> &str {
    version_dir
        .split_once('_')
        .map(|(_, version)| version)
        .unwrap_or("")
}

/// Derives package keys from file URLs on the mirror
///
/// Expected path layout after the anchor segment:
/// `<anchor>/<component>/<bucket>/<package>/<version_dir>/<file>`
#[derive(Debug, Clone)]
pub struct PathExtractor {
    anchor: String,
}

impl PathExtractor {
    pub fn new(anchor: impl Into<String>) -> Self {
        Self {
            anchor: anchor.into(),
        }
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    /// Maps a file URL to its package key and file kind
    ///
    /// Returns None (a skip, not an error) when the anchor is missing, when
    /// fewer than four directory segments follow it, or when the final
    /// segment is not a well-known filename.
    pub fn extract(&self, url: &Url) -> Option<(PackageKey, FileKind)> {
        let segments: Vec<&str> = url.path_segments()?.collect();
        let anchor_index = segments.iter().position(|s| *s == self.anchor)?;
        let rest = &segments[anchor_index + 1..];

        // component, bucket, package, version_dir, file
        if rest.len() < 5 {
            return None;
        }

        let kind = FileKind::from_filename(rest[rest.len() - 1])?;

        if rest[..4].iter().any(|s| s.is_empty()) {
            return None;
        }

        let key = PackageKey {
            component: rest[0].to_string(),
            bucket: rest[1].to_string(),
            package: rest[2].to_string(),
            version_dir: rest[3].to_string(),
        };

        Some((key, kind))
    }
}

impl Default for PathExtractor {
    fn default() -> Self {
        Self::new("pool")
    }
}
