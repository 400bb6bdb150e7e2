//! SigV2-style request authentication for bucketfs.
//!
//! This crate implements the verification side of the legacy AWS signing
//! scheme used by the gateway: given an incoming HTTP request, the resolved
//! bucket/key address, and a credential store, it verifies that the request
//! was signed with the secret key belonging to the claimed access key id.
//!
//! The flow, end to end:
//!
//! 1. Parse the `Authorization` header (`"AWS <access_key_id>:<signature>"`).
//! 2. Resolve the secret key via the [`CredentialProvider`], keyed by
//!    `(bucket, access_key_id)`.
//! 3. Validate the request timestamp against the clock-skew window.
//! 4. Build the canonical string to sign from the request method, content
//!    headers, `x-amz-*` headers, and the canonical resource path.
//! 5. Compute `base64(HMAC-SHA1(secret, canonical))` and compare it to the
//!    provided signature in constant time.
//!
//! The main entry point is [`verify_signed_request`].
//!
//! # Modules
//!
//! - [`canonical`] - canonical string-to-sign construction
//! - [`credentials`] - credential provider trait and in-memory implementation
//! - [`error`] - authentication error types
//! - [`sigv2`] - header parsing, signature computation, and verification

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod sigv2;

pub use credentials::{CredentialProvider, StaticCredentialProvider};
pub use error::AuthError;
pub use sigv2::{AuthResult, verify_signed_request};
