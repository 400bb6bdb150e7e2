//! Credential provider trait and implementations.
//!
//! Credentials are keyed by `(bucket, access_key_id)`: each bucket carries
//! its own set of access keys, and lookup failures distinguish an unknown
//! bucket from an unknown access key within a known bucket. The store is
//! read-only after construction, so concurrent lookups need no locking.

use std::collections::HashMap;

use crate::error::AuthError;

/// Trait for looking up secret keys by bucket and access key id.
///
/// Implementations may back this with a configuration file, a database, or
/// any other credential store. Lookup must be read-only.
pub trait CredentialProvider: Send + Sync {
    /// Retrieve the secret key for the given bucket and access key id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownBucket`] if the bucket has no credentials
    /// configured, or [`AuthError::AccessKeyNotFound`] if the bucket is known
    /// but the access key id is not.
    fn secret_key(&self, bucket: &str, access_key_id: &str) -> Result<String, AuthError>;
}

/// An in-memory credential provider backed by nested `HashMap`s.
///
/// Loaded once at process start and immutable thereafter; there is no
/// runtime credential rotation.
///
/// # Examples
///
/// ```
/// use bucketfs_auth::credentials::{CredentialProvider, StaticCredentialProvider};
///
/// let provider = StaticCredentialProvider::new(vec![(
///     "mybucket".to_owned(),
///     "AKID".to_owned(),
///     "secret".to_owned(),
/// )]);
///
/// assert_eq!(provider.secret_key("mybucket", "AKID").unwrap(), "secret");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    buckets: HashMap<String, HashMap<String, String>>,
}

impl StaticCredentialProvider {
    /// Create a provider from `(bucket, access_key_id, secret_key)` triples.
    ///
    /// Later entries for the same `(bucket, access_key_id)` pair replace
    /// earlier ones; at most one secret exists per pair.
    pub fn new(credentials: impl IntoIterator<Item = (String, String, String)>) -> Self {
        let mut buckets: HashMap<String, HashMap<String, String>> = HashMap::new();
        for (bucket, access_key_id, secret_key) in credentials {
            buckets
                .entry(bucket)
                .or_default()
                .insert(access_key_id, secret_key);
        }
        Self { buckets }
    }

    /// Number of buckets with at least one credential.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn secret_key(&self, bucket: &str, access_key_id: &str) -> Result<String, AuthError> {
        let keys = self
            .buckets
            .get(bucket)
            .ok_or_else(|| AuthError::UnknownBucket(bucket.to_owned()))?;
        keys.get(access_key_id)
            .cloned()
            .ok_or_else(|| AuthError::AccessKeyNotFound(access_key_id.to_owned()))
    }
}
