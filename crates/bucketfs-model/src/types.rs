//! Core data model: addressing, object metadata, and listing results.
//!
//! Everything here is computed fresh per request and never persists beyond
//! the request's lifetime.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the client addressed the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressingStyle {
    /// Bucket name embedded in the `Host` header (`mybucket.storage.example`).
    VirtualHost,
    /// Bucket name as the first URL path segment (`/mybucket/key`).
    Path,
}

/// A request resolved into a bucket and object key.
///
/// Invariants:
///
/// - `key` never begins with `/`.
/// - An empty `key` denotes a bucket-root request.
/// - A trailing `/` on `key` signals a prefix ("directory") operation,
///   distinct from a leaf-object operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    /// The bucket name.
    pub bucket: String,
    /// The object key within the bucket; may be empty.
    pub key: String,
    /// The addressing style the client used.
    pub style: AddressingStyle,
}

impl ResolvedAddress {
    /// Whether this request addresses the bucket root (empty key).
    #[must_use]
    pub fn is_bucket_root(&self) -> bool {
        self.key.is_empty()
    }

    /// Whether the key denotes a prefix ("directory") rather than a leaf
    /// object.
    #[must_use]
    pub fn is_prefix(&self) -> bool {
        self.key.ends_with('/')
    }

    /// The canonical resource path used for signing: `/bucket/key`, or
    /// `/bucket/` for a bucket-root request.
    ///
    /// Virtual-host and path-style requests for the same logical resource
    /// produce the same canonical resource, so both sign identically.
    #[must_use]
    pub fn canonical_resource(&self) -> String {
        format!("/{}/{}", self.bucket, self.key)
    }
}

/// Metadata for one object in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// The object key, relative to the bucket root.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Filesystem modification time of the backing file.
    pub last_modified: DateTime<Utc>,
    /// Hex MD5 digest of the full object content, unquoted.
    pub etag: String,
}

/// The result of a bucket listing.
///
/// Objects are ordered by key; common prefixes are a deduplicated, sorted
/// set. Repeated listings over an unchanged tree are identical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingResult {
    /// Flat objects under the requested prefix.
    pub objects: Vec<ObjectMeta>,
    /// Synthetic "directory" entries, each ending with the delimiter.
    pub common_prefixes: BTreeSet<String>,
}

/// Query parameters of a ListObjects request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsQuery {
    /// Only keys under this prefix are listed. Empty means the whole bucket.
    pub prefix: String,
    /// Keys containing this delimiter past the prefix collapse into common
    /// prefixes. Empty means a full recursive listing.
    pub delimiter: String,
}

impl ListObjectsQuery {
    /// Build from parsed query parameters, taking the first `prefix` and
    /// `delimiter` values and defaulting both to empty.
    #[must_use]
    pub fn from_params(params: &[(String, String)]) -> Self {
        let value = |name: &str| {
            params
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        Self {
            prefix: value("prefix"),
            delimiter: value("delimiter"),
        }
    }
}

/// The gateway operations a request can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOperation {
    /// GET on the bucket root.
    ListObjects,
    /// GET on a leaf key.
    GetObject,
    /// PUT on a leaf key.
    PutObject,
    /// PUT on a trailing-slash key.
    CreatePrefix,
    /// DELETE on a leaf key.
    DeleteObject,
    /// DELETE on a trailing-slash key.
    DeletePrefix,
}

impl GatewayOperation {
    /// Returns the operation name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListObjects => "ListObjects",
            Self::GetObject => "GetObject",
            Self::PutObject => "PutObject",
            Self::CreatePrefix => "CreatePrefix",
            Self::DeleteObject => "DeleteObject",
            Self::DeletePrefix => "DeletePrefix",
        }
    }
}

impl std::fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(bucket: &str, key: &str, style: AddressingStyle) -> ResolvedAddress {
        ResolvedAddress {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            style,
        }
    }

    #[test]
    fn test_should_build_canonical_resource_for_bucket_root() {
        let addr = address("mybucket", "", AddressingStyle::Path);
        assert!(addr.is_bucket_root());
        assert_eq!(addr.canonical_resource(), "/mybucket/");
    }

    #[test]
    fn test_should_build_identical_canonical_resource_for_both_styles() {
        let vhost = address("mybucket", "foo/bar.txt", AddressingStyle::VirtualHost);
        let path = address("mybucket", "foo/bar.txt", AddressingStyle::Path);
        assert_eq!(vhost.canonical_resource(), path.canonical_resource());
        assert_eq!(vhost.canonical_resource(), "/mybucket/foo/bar.txt");
    }

    #[test]
    fn test_should_detect_prefix_keys() {
        let addr = address("b", "photos/", AddressingStyle::Path);
        assert!(addr.is_prefix());
        assert!(!addr.is_bucket_root());
    }

    #[test]
    fn test_should_parse_list_query_params() {
        let params = vec![
            ("prefix".to_owned(), "photos/".to_owned()),
            ("delimiter".to_owned(), "/".to_owned()),
            ("marker".to_owned(), "ignored".to_owned()),
        ];
        let query = ListObjectsQuery::from_params(&params);
        assert_eq!(query.prefix, "photos/");
        assert_eq!(query.delimiter, "/");
    }

    #[test]
    fn test_should_default_list_query_to_empty() {
        let query = ListObjectsQuery::from_params(&[]);
        assert_eq!(query.prefix, "");
        assert_eq!(query.delimiter, "");
    }
}
