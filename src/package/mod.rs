//! Package identity and metadata records
//!
//! - `PackageKey`: the (component, bucket, package, version directory) tuple
//!   identifying one package version directory on the mirror
//! - `FileKind`: which of the two well-known files a URL points at
//! - `PathExtractor`: maps a file URL to its key and kind
//! - `PackageRecord`: the merged metadata emitted for each key

mod extract;
mod record;

pub use extract::{parse_version, FileKind, PackageKey, PathExtractor, WELL_KNOWN_FILES};
pub use record::PackageRecord;
