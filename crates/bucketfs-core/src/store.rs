//! Filesystem object store.
//!
//! Maps `(bucket, key)` onto paths under a root data directory: one
//! subdirectory per bucket, object keys as relative paths inside it.
//! Operations are blocking `std::fs` calls; async callers run them on the
//! blocking thread pool (see [`crate::gateway`]).
//!
//! Keys are confined to the bucket subtree: absolute keys and keys
//! containing `..` components are rejected before touching the filesystem.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use md5::{Digest, Md5};
use tracing::debug;

use bucketfs_model::{ErrorCode, GatewayError};

/// Result of writing an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutResult {
    /// Hex MD5 digest of the written content, unquoted.
    pub etag: String,
    /// Size of the written content in bytes.
    pub size: u64,
}

/// Filesystem store rooted at the gateway data directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `root`. The directory is not created here;
    /// bucket subtrees are expected to be provisioned out of band.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a bucket name to its root directory.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for empty names or names containing path
    /// separators or `..`.
    pub fn bucket_path(&self, bucket: &str) -> Result<PathBuf, GatewayError> {
        if bucket.is_empty() || bucket.contains('/') || bucket == ".." || bucket == "." {
            return Err(GatewayError::invalid_argument(format!(
                "invalid bucket name: {bucket:?}"
            )));
        }
        Ok(self.root.join(bucket))
    }

    /// Resolve `(bucket, key)` to the object's filesystem path.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for invalid bucket names, empty keys,
    /// absolute keys, and keys with `..` or `.` components.
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, GatewayError> {
        let bucket_root = self.bucket_path(bucket)?;
        validate_key(key)?;
        Ok(bucket_root.join(key))
    }

    /// Read an object's full content.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchKey` if the path does not exist, `InvalidArgument` if
    /// it is a directory, or `InternalError` for other I/O failures.
    pub fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, GatewayError> {
        let path = self.object_path(bucket, key)?;
        if path.is_dir() {
            return Err(GatewayError::invalid_argument(format!(
                "key {key:?} is a prefix, not an object"
            )));
        }
        match std::fs::read(&path) {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(GatewayError::new(ErrorCode::NoSuchKey))
            }
            Err(e) => Err(io_error("read object", &path, &e)),
        }
    }

    /// Write an object, creating parent directories as needed.
    ///
    /// Returns the MD5 etag and size of the written content.
    ///
    /// # Errors
    ///
    /// Returns `InternalError` on I/O failure.
    pub fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> Result<PutResult, GatewayError> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error("create parent", parent, &e))?;
        }
        std::fs::write(&path, data).map_err(|e| io_error("write object", &path, &e))?;

        let etag = hex::encode(Md5::digest(data));
        debug!(bucket, key, size = data.len(), %etag, "wrote object");
        Ok(PutResult {
            etag,
            size: data.len() as u64,
        })
    }

    /// Delete a single object.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchKey` if the object does not exist.
    pub fn delete_object(&self, bucket: &str, key: &str) -> Result<(), GatewayError> {
        let path = self.object_path(bucket, key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(bucket, key, "deleted object");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(GatewayError::new(ErrorCode::NoSuchKey))
            }
            Err(e) => Err(io_error("delete object", &path, &e)),
        }
    }

    /// Create a prefix ("directory"). Idempotent: an existing prefix is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns `InternalError` on I/O failure.
    pub fn create_prefix(&self, bucket: &str, key: &str) -> Result<(), GatewayError> {
        let path = self.object_path(bucket, key.trim_end_matches('/'))?;
        std::fs::create_dir_all(&path).map_err(|e| io_error("create prefix", &path, &e))?;
        debug!(bucket, key, "created prefix");
        Ok(())
    }

    /// Delete a prefix and everything under it.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchKey` if the prefix does not exist, or
    /// `InvalidArgument` if the path names an object rather than a prefix.
    pub fn delete_prefix(&self, bucket: &str, key: &str) -> Result<(), GatewayError> {
        let path = self.object_path(bucket, key.trim_end_matches('/'))?;
        match std::fs::remove_dir_all(&path) {
            Ok(()) => {
                debug!(bucket, key, "deleted prefix");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(GatewayError::new(ErrorCode::NoSuchKey))
            }
            Err(e) if e.kind() == io::ErrorKind::NotADirectory => {
                Err(GatewayError::invalid_argument(format!(
                    "key {key:?} is an object, not a prefix"
                )))
            }
            Err(e) => Err(io_error("delete prefix", &path, &e)),
        }
    }

    /// Whether the bucket's root directory exists.
    #[must_use]
    pub fn bucket_exists(&self, bucket: &str) -> bool {
        self.bucket_path(bucket).is_ok_and(|p| p.is_dir())
    }
}

/// Reject keys that would escape the bucket subtree.
fn validate_key(key: &str) -> Result<(), GatewayError> {
    if key.is_empty() {
        return Err(GatewayError::invalid_argument("empty object key"));
    }
    if key.starts_with('/') {
        return Err(GatewayError::invalid_argument(
            "object key must not begin with '/'",
        ));
    }
    if key.split('/').any(|component| component == ".." || component == ".") {
        return Err(GatewayError::invalid_argument(format!(
            "object key {key:?} contains path traversal components"
        )));
    }
    Ok(())
}

/// Wrap an unexpected I/O error, keeping the operation and path in the
/// message for the server log.
fn io_error(op: &str, path: &Path, err: &io::Error) -> GatewayError {
    GatewayError::internal(format!("{op} {}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_bucket(bucket: &str) -> (TempDir, FsStore) {
        let dir = TempDir::new().expect("tempdir");
        std::fs::create_dir(dir.path().join(bucket)).expect("bucket dir");
        let store = FsStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_should_put_and_get_object() {
        let (_dir, store) = store_with_bucket("b");
        let result = store.put_object("b", "foo/bar.txt", b"hello").unwrap();
        // MD5("hello")
        assert_eq!(result.etag, "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(result.size, 5);

        let data = store.get_object("b", "foo/bar.txt").unwrap();
        assert_eq!(&data[..], b"hello");
    }

    #[test]
    fn test_should_return_no_such_key_for_missing_object() {
        let (_dir, store) = store_with_bucket("b");
        let err = store.get_object("b", "ghost.txt").unwrap_err();
        assert_eq!(err.code, ErrorCode::NoSuchKey);
    }

    #[test]
    fn test_should_reject_get_of_directory() {
        let (_dir, store) = store_with_bucket("b");
        store.create_prefix("b", "photos/").unwrap();
        let err = store.get_object("b", "photos").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_should_delete_object() {
        let (_dir, store) = store_with_bucket("b");
        store.put_object("b", "x.txt", b"x").unwrap();
        store.delete_object("b", "x.txt").unwrap();
        let err = store.delete_object("b", "x.txt").unwrap_err();
        assert_eq!(err.code, ErrorCode::NoSuchKey);
    }

    #[test]
    fn test_should_create_prefix_idempotently() {
        let (_dir, store) = store_with_bucket("b");
        store.create_prefix("b", "a/b/").unwrap();
        store.create_prefix("b", "a/b/").unwrap();
        assert!(store.bucket_path("b").unwrap().join("a/b").is_dir());
    }

    #[test]
    fn test_should_delete_prefix_recursively() {
        let (_dir, store) = store_with_bucket("b");
        store.put_object("b", "a/deep/file.txt", b"data").unwrap();
        store.delete_prefix("b", "a/").unwrap();
        assert!(!store.bucket_path("b").unwrap().join("a").exists());

        let err = store.delete_prefix("b", "a/").unwrap_err();
        assert_eq!(err.code, ErrorCode::NoSuchKey);
    }

    #[test]
    fn test_should_reject_delete_prefix_of_object() {
        let (_dir, store) = store_with_bucket("b");
        store.put_object("b", "f.txt", b"data").unwrap();
        let err = store.delete_prefix("b", "f.txt/").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_should_reject_path_traversal_keys() {
        let (_dir, store) = store_with_bucket("b");
        for key in ["../escape", "a/../../b", "./x", "/abs"] {
            let err = store.object_path("b", key).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidArgument, "key {key:?}");
        }
    }

    #[test]
    fn test_should_reject_invalid_bucket_names() {
        let store = FsStore::new("/tmp");
        for bucket in ["", "a/b", "..", "."] {
            let err = store.bucket_path(bucket).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidArgument, "bucket {bucket:?}");
        }
    }

    #[test]
    fn test_should_report_bucket_existence() {
        let (_dir, store) = store_with_bucket("b");
        assert!(store.bucket_exists("b"));
        assert!(!store.bucket_exists("ghost"));
    }
}
