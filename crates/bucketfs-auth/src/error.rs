//! Error types for request authentication.
//!
//! All authentication failures are represented by [`AuthError`]. The HTTP
//! boundary converts them into the gateway error taxonomy via the
//! `From<AuthError> for GatewayError` impl; the distinction between an
//! unknown bucket and an unknown access key within a known bucket survives
//! that conversion.

use bucketfs_model::{ErrorCode, GatewayError};

/// Errors that can occur during signature verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The `Authorization` header is missing from the request.
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    /// The `Authorization` header could not be parsed as
    /// `"<scheme> <access_key_id>:<signature>"`.
    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    /// The signing scheme is not supported (only `AWS` is supported).
    #[error("Unsupported signing scheme: {0}")]
    UnsupportedScheme(String),

    /// Neither `Date` nor `X-Amz-Date` is present.
    #[error("Missing Date header")]
    MissingDateHeader,

    /// The request date could not be parsed.
    #[error("Invalid request date: {0}")]
    InvalidDate(String),

    /// The request timestamp is outside the allowed clock-skew window.
    #[error("Request time too skewed")]
    RequestTimeTooSkewed,

    /// The addressed bucket has no credentials configured.
    #[error("Unknown bucket: {0}")]
    UnknownBucket(String),

    /// The bucket is known, but the access key id is not.
    #[error("Access key not found: {0}")]
    AccessKeyNotFound(String),

    /// The computed signature does not match the provided signature.
    #[error("Signature does not match")]
    SignatureDoesNotMatch,
}

impl From<AuthError> for GatewayError {
    fn from(err: AuthError) -> Self {
        let code = match &err {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::UnsupportedScheme(_)
            | AuthError::MissingDateHeader
            | AuthError::InvalidDate(_) => ErrorCode::InvalidArgument,
            AuthError::RequestTimeTooSkewed => ErrorCode::RequestTimeTooSkewed,
            AuthError::UnknownBucket(_) => ErrorCode::NoSuchBucket,
            AuthError::AccessKeyNotFound(_) => ErrorCode::InvalidAccessKeyId,
            AuthError::SignatureDoesNotMatch => ErrorCode::SignatureDoesNotMatch,
        };
        GatewayError::with_message(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_map_unknown_bucket_and_access_key_to_distinct_codes() {
        let bucket: GatewayError = AuthError::UnknownBucket("b".to_owned()).into();
        let key_id: GatewayError = AuthError::AccessKeyNotFound("AKID".to_owned()).into();
        assert_eq!(bucket.code, ErrorCode::NoSuchBucket);
        assert_eq!(key_id.code, ErrorCode::InvalidAccessKeyId);
    }

    #[test]
    fn test_should_map_parse_failures_to_invalid_argument() {
        let err: GatewayError = AuthError::InvalidAuthHeader.into();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }

    #[test]
    fn test_should_map_skew_to_request_time_too_skewed() {
        let err: GatewayError = AuthError::RequestTimeTooSkewed.into();
        assert_eq!(err.code, ErrorCode::RequestTimeTooSkewed);
    }
}
