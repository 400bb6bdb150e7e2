//! Request routing: addressing-style resolution and operation
//! identification.
//!
//! The [`AddressResolver`] determines, from the `Host` header and URL path,
//! whether a request uses virtual-hosted-style or path-style addressing and
//! splits it into bucket name and object key. Resolution needs only
//! headers, no I/O, and runs before anything else in the pipeline.
//!
//! [`identify_operation`] then maps the HTTP method and key shape onto a
//! gateway operation: a bucket-root GET is a listing, a trailing-slash key
//! selects the prefix variants of PUT/DELETE.

use http::Method;
use percent_encoding::percent_decode_str;

use bucketfs_model::{
    AddressingStyle, ErrorCode, GatewayError, GatewayOperation, ResolvedAddress,
};

/// Resolves requests into `(bucket, key)` addresses.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    /// Domain suffix for virtual hosting, stored with a leading dot
    /// (`.storage.example`).
    suffix: String,
    /// Whether virtual-hosted-style addressing is enabled at all.
    virtual_hosting: bool,
}

impl AddressResolver {
    /// Create a resolver for the given virtual-host suffix. A configured
    /// suffix with or without its leading dot is accepted.
    #[must_use]
    pub fn new(suffix: impl AsRef<str>, virtual_hosting: bool) -> Self {
        let suffix = suffix.as_ref();
        let suffix = if suffix.starts_with('.') {
            suffix.to_owned()
        } else {
            format!(".{suffix}")
        };
        Self {
            suffix,
            virtual_hosting,
        }
    }

    /// Resolve a request into a [`ResolvedAddress`].
    ///
    /// Any query string on `path` is stripped before resolution. If the
    /// `Host` header (minus port) ends with the configured suffix, the
    /// remainder before it is the bucket and the entire path (minus leading
    /// slash) is the key. Otherwise the first path segment is the bucket
    /// and the rest is the key. Bucket and key are percent-decoded exactly
    /// once.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when neither pattern yields a bucket.
    pub fn resolve(&self, host: Option<&str>, path: &str) -> Result<ResolvedAddress, GatewayError> {
        let path = path.split('?').next().unwrap_or(path);

        if self.virtual_hosting
            && let Some(bucket) = host.and_then(|h| self.virtual_host_bucket(h))
        {
            let key = path.strip_prefix('/').unwrap_or(path);
            return Ok(ResolvedAddress {
                bucket,
                key: decode_component(key),
                style: AddressingStyle::VirtualHost,
            });
        }

        let trimmed = path.strip_prefix('/').unwrap_or(path);
        if trimmed.is_empty() {
            return Err(GatewayError::invalid_argument(
                "request addresses no bucket",
            ));
        }

        let (bucket, key) = match trimmed.split_once('/') {
            Some((bucket, key)) => (bucket, key),
            None => (trimmed, ""),
        };
        if bucket.is_empty() {
            return Err(GatewayError::invalid_argument(
                "request addresses no bucket",
            ));
        }

        Ok(ResolvedAddress {
            bucket: decode_component(bucket),
            key: decode_component(key),
            style: AddressingStyle::Path,
        })
    }

    /// Extract the bucket from a virtual-hosted-style `Host` header, if the
    /// header matches the configured suffix.
    fn virtual_host_bucket(&self, host: &str) -> Option<String> {
        let host = host.split(':').next().unwrap_or(host);
        let bucket = host.strip_suffix(self.suffix.as_str())?;
        if bucket.is_empty() || bucket.contains('.') {
            return None;
        }
        Some(bucket.to_owned())
    }
}

/// Decode a percent-encoded URI component exactly once.
fn decode_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Parse a query string into key-value pairs.
#[must_use]
pub fn parse_query_params(query: &str) -> Vec<(String, String)> {
    if query.is_empty() {
        return Vec::new();
    }

    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode_component(key), decode_component(value)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

/// Identify the gateway operation from the HTTP method and the resolved
/// address.
///
/// # Errors
///
/// Returns `MethodNotAllowed` for verbs the gateway does not serve, and
/// `InvalidArgument` for verb/shape combinations that make no sense
/// (PUT or DELETE on the bucket root).
pub fn identify_operation(
    method: &Method,
    address: &ResolvedAddress,
) -> Result<GatewayOperation, GatewayError> {
    match *method {
        Method::GET => {
            if address.is_bucket_root() {
                Ok(GatewayOperation::ListObjects)
            } else {
                Ok(GatewayOperation::GetObject)
            }
        }
        Method::PUT => {
            if address.is_bucket_root() {
                Err(GatewayError::invalid_argument(
                    "PUT requires an object key",
                ))
            } else if address.is_prefix() {
                Ok(GatewayOperation::CreatePrefix)
            } else {
                Ok(GatewayOperation::PutObject)
            }
        }
        Method::DELETE => {
            if address.is_bucket_root() {
                Err(GatewayError::invalid_argument(
                    "DELETE requires an object key",
                ))
            } else if address.is_prefix() {
                Ok(GatewayOperation::DeletePrefix)
            } else {
                Ok(GatewayOperation::DeleteObject)
            }
        }
        _ => Err(GatewayError::new(ErrorCode::MethodNotAllowed)),
    }
}
