//! HTTP layer of the bucketfs gateway.
//!
//! Ties together address resolution, SigV2 authentication, operation
//! dispatch, and response serialization into a hyper-compatible service.
//!
//! # Modules
//!
//! - [`router`] - virtual-host/path-style address resolution and operation
//!   identification
//! - [`body`] - the response body type
//! - [`response`] - XML, empty, and error response builders
//! - [`dispatch`] - the handler trait the business logic implements
//! - [`service`] - the hyper `Service` running the request pipeline

pub mod body;
pub mod dispatch;
pub mod response;
pub mod router;
pub mod service;

pub use body::GatewayBody;
pub use dispatch::{GatewayHandler, RoutedRequest};
pub use router::AddressResolver;
pub use service::{GatewayHttpService, HttpConfig};
