//! The async gateway provider.
//!
//! [`Gateway`] owns the configuration and filesystem store and exposes one
//! async method per operation. All filesystem work runs on the blocking
//! thread pool; the store itself holds no mutable state, so any number of
//! requests may execute concurrently.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use bucketfs_model::{GatewayError, ListObjectsQuery, ListingResult};

use crate::config::GatewayConfig;
use crate::list;
use crate::store::{FsStore, PutResult};

/// The filesystem-backed gateway: configuration plus store.
#[derive(Debug, Clone)]
pub struct Gateway {
    config: Arc<GatewayConfig>,
    store: FsStore,
}

impl Gateway {
    /// Create a gateway from configuration; the store is rooted at the
    /// configured data directory.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        let store = FsStore::new(config.data_dir.clone());
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// The gateway configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// List a bucket's objects under a prefix, grouped by delimiter.
    ///
    /// # Errors
    ///
    /// `NoSuchBucket` for unknown buckets, `NotImplemented` for unsupported
    /// delimiters, `InvalidArgument` for traversal prefixes.
    pub async fn list_objects(
        &self,
        bucket: &str,
        query: ListObjectsQuery,
    ) -> Result<ListingResult, GatewayError> {
        let bucket_root = self.store.bucket_path(bucket)?;
        debug!(
            bucket,
            prefix = %query.prefix,
            delimiter = %query.delimiter,
            "listing objects"
        );
        run_blocking(move || list::list_objects(&bucket_root, &query.prefix, &query.delimiter))
            .await
    }

    /// Read an object's content.
    ///
    /// # Errors
    ///
    /// `NoSuchKey` if absent, `InvalidArgument` if the key is a prefix.
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, GatewayError> {
        let store = self.store.clone();
        let (bucket, key) = (bucket.to_owned(), key.to_owned());
        run_blocking(move || store.get_object(&bucket, &key)).await
    }

    /// Write an object, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for traversal keys, `InternalError` on I/O failure.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
    ) -> Result<PutResult, GatewayError> {
        let store = self.store.clone();
        let (bucket, key) = (bucket.to_owned(), key.to_owned());
        run_blocking(move || store.put_object(&bucket, &key, &body)).await
    }

    /// Delete a single object.
    ///
    /// # Errors
    ///
    /// `NoSuchKey` if the object does not exist.
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), GatewayError> {
        let store = self.store.clone();
        let (bucket, key) = (bucket.to_owned(), key.to_owned());
        run_blocking(move || store.delete_object(&bucket, &key)).await
    }

    /// Create a prefix ("directory"); idempotent.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for traversal keys, `InternalError` on I/O failure.
    pub async fn create_prefix(&self, bucket: &str, key: &str) -> Result<(), GatewayError> {
        let store = self.store.clone();
        let (bucket, key) = (bucket.to_owned(), key.to_owned());
        run_blocking(move || store.create_prefix(&bucket, &key)).await
    }

    /// Delete a prefix and everything under it.
    ///
    /// # Errors
    ///
    /// `NoSuchKey` if the prefix does not exist.
    pub async fn delete_prefix(&self, bucket: &str, key: &str) -> Result<(), GatewayError> {
        let store = self.store.clone();
        let (bucket, key) = (bucket.to_owned(), key.to_owned());
        run_blocking(move || store.delete_prefix(&bucket, &key)).await
    }
}

/// Run a blocking filesystem closure on the blocking pool, mapping a
/// cancelled or panicked task to `InternalError`.
async fn run_blocking<T, F>(f: F) -> Result<T, GatewayError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, GatewayError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| GatewayError::internal(format!("blocking task failed: {e}")))?
}
