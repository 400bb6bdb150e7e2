//! Operation dispatch: the boundary between the HTTP layer and the
//! business logic.
//!
//! The service resolves and authenticates a request, packages the result as
//! a [`RoutedRequest`], and hands it to the [`GatewayHandler`]
//! implementation. The handler returns a fully formed HTTP response or a
//! [`GatewayError`] the service renders as an XML error document.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use tracing::debug;

use bucketfs_model::{GatewayError, GatewayOperation, ResolvedAddress};

use crate::body::GatewayBody;

/// A request that passed routing: the resolved address, the identified
/// operation, and the parsed query parameters.
#[derive(Debug, Clone)]
pub struct RoutedRequest {
    /// The resolved bucket and key.
    pub address: ResolvedAddress,
    /// The identified operation.
    pub operation: GatewayOperation,
    /// Query parameters, decoded, in request order.
    pub query: Vec<(String, String)>,
}

impl RoutedRequest {
    /// Look up the first query parameter with the given name.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Trait the business logic implements.
///
/// Uses boxed futures so the service layer can hold the handler behind a
/// generic parameter without `async fn` in the trait surface.
pub trait GatewayHandler: Send + Sync + 'static {
    /// Handle a routed operation and produce an HTTP response.
    fn handle_operation(
        &self,
        routed: RoutedRequest,
        parts: http::request::Parts,
        body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<http::Response<GatewayBody>, GatewayError>> + Send>>;
}

/// Dispatch a routed request to the handler.
///
/// # Errors
///
/// Propagates whatever [`GatewayError`] the handler returns.
pub async fn dispatch_operation<H: GatewayHandler>(
    handler: &H,
    routed: RoutedRequest,
    parts: http::request::Parts,
    body: Bytes,
) -> Result<http::Response<GatewayBody>, GatewayError> {
    debug!(
        operation = %routed.operation,
        bucket = %routed.address.bucket,
        key = %routed.address.key,
        "dispatching operation"
    );
    handler.handle_operation(routed, parts, body).await
}

/// A handler that fails every operation with `NotImplemented`.
///
/// Useful for exercising the routing and authentication layers in
/// isolation.
#[derive(Debug, Clone, Default)]
pub struct NotImplementedHandler;

impl GatewayHandler for NotImplementedHandler {
    fn handle_operation(
        &self,
        routed: RoutedRequest,
        _parts: http::request::Parts,
        _body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<http::Response<GatewayBody>, GatewayError>> + Send>>
    {
        Box::pin(async move { Err(GatewayError::not_implemented(routed.operation.as_str())) })
    }
}
