//! The gateway error taxonomy.
//!
//! Errors are a closed set of named kinds, each carrying the HTTP status code
//! the boundary layer renders. All of them are recoverable at the HTTP
//! response boundary: they are caught once, in the service layer, and
//! translated into an S3-shaped XML error document. None propagate as
//! process-fatal.

use http::StatusCode;

/// Well-known gateway error codes.
///
/// Each code maps to an S3 error `Code` string, an HTTP status, and a default
/// human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The request was authenticated but the operation is not permitted.
    AccessDenied,
    /// An unexpected condition prevented the request from completing.
    InternalError,
    /// The access key id does not exist for the addressed bucket.
    InvalidAccessKeyId,
    /// A request parameter, header, or path was malformed.
    InvalidArgument,
    /// The HTTP method is not allowed against this resource.
    MethodNotAllowed,
    /// The `Content-Length` header is missing or does not match the body.
    MissingContentLength,
    /// The addressed bucket does not exist.
    NoSuchBucket,
    /// The addressed object key does not exist.
    NoSuchKey,
    /// The requested functionality is not implemented.
    NotImplemented,
    /// The request timestamp is outside the allowed clock-skew window.
    RequestTimeTooSkewed,
    /// The request signature does not match the computed signature.
    SignatureDoesNotMatch,
}

impl ErrorCode {
    /// Returns the S3 error code string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessDenied => "AccessDenied",
            Self::InternalError => "InternalError",
            Self::InvalidAccessKeyId => "InvalidAccessKeyId",
            Self::InvalidArgument => "InvalidArgument",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::MissingContentLength => "MissingContentLength",
            Self::NoSuchBucket => "NoSuchBucket",
            Self::NoSuchKey => "NoSuchKey",
            Self::NotImplemented => "NotImplemented",
            Self::RequestTimeTooSkewed => "RequestTimeTooSkewed",
            Self::SignatureDoesNotMatch => "SignatureDoesNotMatch",
        }
    }

    /// Returns the HTTP status code rendered for this error.
    #[must_use]
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::InvalidArgument => StatusCode::BAD_REQUEST,
            Self::AccessDenied
            | Self::InvalidAccessKeyId
            | Self::RequestTimeTooSkewed
            | Self::SignatureDoesNotMatch => StatusCode::FORBIDDEN,
            Self::NoSuchBucket | Self::NoSuchKey => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingContentLength => StatusCode::LENGTH_REQUIRED,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
        }
    }

    /// Returns the default message for this error.
    #[must_use]
    pub fn default_message(self) -> &'static str {
        match self {
            Self::AccessDenied => "Access Denied",
            Self::InternalError => "Internal server error",
            Self::InvalidAccessKeyId => {
                "The access key id you provided does not exist in our records"
            }
            Self::InvalidArgument => "Invalid Argument",
            Self::MethodNotAllowed => "The specified method is not allowed against this resource",
            Self::MissingContentLength => "You must provide the Content-Length HTTP header",
            Self::NoSuchBucket => "The specified bucket does not exist",
            Self::NoSuchKey => "The specified key does not exist",
            Self::NotImplemented => "The functionality is not implemented",
            Self::RequestTimeTooSkewed => {
                "The difference between the request time and the server's time is too large"
            }
            Self::SignatureDoesNotMatch => "The request signature does not match",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gateway error: an [`ErrorCode`] plus a contextual message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct GatewayError {
    /// The error code.
    pub code: ErrorCode,
    /// The message rendered in the error response body.
    pub message: String,
}

impl GatewayError {
    /// Create an error with the code's default message.
    #[must_use]
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_owned(),
        }
    }

    /// Create an error with a custom message.
    #[must_use]
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for an [`ErrorCode::InvalidArgument`] error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidArgument, message)
    }

    /// Shorthand for an [`ErrorCode::NotImplemented`] error.
    #[must_use]
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::NotImplemented, message)
    }

    /// Shorthand for an [`ErrorCode::InternalError`] error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, message)
    }

    /// The HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }
}

impl From<ErrorCode> for GatewayError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}
