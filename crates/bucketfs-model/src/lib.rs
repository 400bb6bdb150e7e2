//! Shared types for the bucketfs S3-compatible gateway.
//!
//! This crate defines the data model exchanged between the HTTP layer, the
//! authenticator, and the filesystem gateway:
//!
//! - [`types`] - resolved addresses, object metadata, listing results, and
//!   the gateway operation enum
//! - [`error`] - the closed error taxonomy with HTTP status mapping

pub mod error;
pub mod types;

pub use error::{ErrorCode, GatewayError};
pub use types::{
    AddressingStyle, GatewayOperation, ListObjectsQuery, ListingResult, ObjectMeta,
    ResolvedAddress,
};
