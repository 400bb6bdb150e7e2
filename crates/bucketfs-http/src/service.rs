//! The gateway HTTP service implementing hyper's `Service` trait.
//!
//! [`GatewayHttpService`] ties together routing, authentication, dispatch,
//! and response serialization. Each request runs through:
//!
//! 1. Address resolution via [`AddressResolver`]
//! 2. Request body collection
//! 3. Signature verification (unless disabled)
//! 4. Operation identification and content header validation
//! 5. Dispatch to the [`GatewayHandler`]
//! 6. Common response headers (`x-amz-request-id`, `Server`, `Date`)
//! 7. Error response formatting

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use chrono::TimeDelta;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::Service;
use tracing::{debug, warn};
use uuid::Uuid;

use bucketfs_auth::{CredentialProvider, sigv2::DEFAULT_MAX_CLOCK_SKEW_SECS, verify_signed_request};
use bucketfs_model::{ErrorCode, GatewayError, GatewayOperation, ResolvedAddress};

use crate::body::GatewayBody;
use crate::dispatch::{GatewayHandler, RoutedRequest, dispatch_operation};
use crate::response::{add_common_headers, error_to_response};
use crate::router::{AddressResolver, identify_operation, parse_query_params};

/// Configuration for the gateway HTTP service.
#[derive(Clone)]
pub struct HttpConfig {
    /// The base domain for virtual-hosted-style requests (e.g., `s3.localhost`).
    pub virtual_host_suffix: String,
    /// Whether virtual-hosted-style bucket addressing is enabled.
    pub virtual_hosting: bool,
    /// Whether to skip signature validation (useful for development).
    pub skip_signature_validation: bool,
    /// The allowed clock-skew window for request timestamps, in seconds.
    pub max_clock_skew_secs: i64,
    /// Credential provider for signature verification. Required unless
    /// `skip_signature_validation` is set.
    pub credential_provider: Option<Arc<dyn CredentialProvider>>,
}

impl std::fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConfig")
            .field("virtual_host_suffix", &self.virtual_host_suffix)
            .field("virtual_hosting", &self.virtual_hosting)
            .field("skip_signature_validation", &self.skip_signature_validation)
            .field("max_clock_skew_secs", &self.max_clock_skew_secs)
            .field(
                "credential_provider",
                &self.credential_provider.as_ref().map(|_| "..."),
            )
            .finish()
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            virtual_host_suffix: "s3.localhost".to_owned(),
            virtual_hosting: true,
            skip_signature_validation: false,
            max_clock_skew_secs: DEFAULT_MAX_CLOCK_SKEW_SECS,
            credential_provider: None,
        }
    }
}

/// The gateway HTTP service.
///
/// # Type Parameters
///
/// - `H`: The business logic handler implementing [`GatewayHandler`].
#[derive(Debug)]
pub struct GatewayHttpService<H: GatewayHandler> {
    handler: Arc<H>,
    resolver: AddressResolver,
    config: Arc<HttpConfig>,
}

impl<H: GatewayHandler> GatewayHttpService<H> {
    /// Create a service with the given handler and configuration.
    #[must_use]
    pub fn new(handler: H, config: HttpConfig) -> Self {
        Self::from_shared(Arc::new(handler), config)
    }

    /// Create a service from an `Arc<H>` handler and configuration.
    #[must_use]
    pub fn from_shared(handler: Arc<H>, config: HttpConfig) -> Self {
        let resolver = AddressResolver::new(&config.virtual_host_suffix, config.virtual_hosting);
        Self {
            handler,
            resolver,
            config: Arc::new(config),
        }
    }

    /// Run a request through the full pipeline and produce a response.
    ///
    /// Generic over the request body so tests can drive the pipeline with
    /// buffered bodies instead of a hyper connection.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<GatewayBody>
    where
        B: http_body::Body,
        B::Error: std::fmt::Display,
    {
        let request_id = Uuid::new_v4().to_string();
        let resource = req.uri().path().to_owned();

        let response = match self.process(req, &request_id).await {
            Ok(response) => response,
            Err((err, resource_override)) => {
                let resource = resource_override.as_deref().unwrap_or(&resource);
                warn!(error = %err, request_id, resource, "request failed");
                error_to_response(&err, resource, &request_id)
            }
        };

        add_common_headers(response, &request_id)
    }

    /// The fallible part of the pipeline. Errors carry an optional canonical
    /// resource path for the error document; `None` means the raw request
    /// path is used.
    async fn process<B>(
        &self,
        req: http::Request<B>,
        request_id: &str,
    ) -> Result<http::Response<GatewayBody>, (GatewayError, Option<String>)>
    where
        B: http_body::Body,
        B::Error: std::fmt::Display,
    {
        let host = req
            .headers()
            .get(http::header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        let query = req.uri().query().map_or_else(Vec::new, parse_query_params);

        debug!(
            method = %req.method(),
            uri = %req.uri(),
            request_id,
            "processing request"
        );

        let address = self
            .resolver
            .resolve(host.as_deref(), req.uri().path())
            .map_err(|e| (e, None))?;
        let resource = address.canonical_resource();

        let (parts, incoming) = req.into_parts();
        let body = incoming
            .collect()
            .await
            .map(http_body_util::Collected::to_bytes)
            .map_err(|e| {
                (
                    GatewayError::internal(format!("failed to read request body: {e}")),
                    Some(resource.clone()),
                )
            })?;

        self.verify_auth(&parts, &address)
            .map_err(|e| (e, Some(resource.clone())))?;

        let operation =
            identify_operation(&parts.method, &address).map_err(|e| (e, Some(resource.clone())))?;
        validate_content_headers(operation, &parts, &body)
            .map_err(|e| (e, Some(resource.clone())))?;

        let routed = RoutedRequest {
            address,
            operation,
            query,
        };

        dispatch_operation(self.handler.as_ref(), routed, parts, body)
            .await
            .map_err(|e| (e, Some(resource)))
    }

    /// Verify the request signature unless validation is disabled.
    fn verify_auth(
        &self,
        parts: &http::request::Parts,
        address: &ResolvedAddress,
    ) -> Result<(), GatewayError> {
        if self.config.skip_signature_validation {
            return Ok(());
        }

        let Some(provider) = self.config.credential_provider.as_ref() else {
            return Err(GatewayError::internal(
                "signature validation enabled without a credential provider",
            ));
        };

        let max_skew = TimeDelta::seconds(self.config.max_clock_skew_secs);
        let result = verify_signed_request(parts, address, provider.as_ref(), max_skew)
            .map_err(GatewayError::from)?;
        debug!(access_key_id = %result.access_key_id, "request authenticated");
        Ok(())
    }
}

impl<H: GatewayHandler> Clone for GatewayHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            resolver: self.resolver.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H: GatewayHandler> Service<http::Request<Incoming>> for GatewayHttpService<H> {
    type Response = http::Response<GatewayBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.handle(req).await) })
    }
}

/// Validate `Content-Length` and `Content-Type` for write operations.
///
/// Object and prefix PUTs require a `Content-Length` that matches the
/// collected body. Object PUTs additionally require a `Content-Type`.
fn validate_content_headers(
    operation: GatewayOperation,
    parts: &http::request::Parts,
    body: &Bytes,
) -> Result<(), GatewayError> {
    if !matches!(
        operation,
        GatewayOperation::PutObject | GatewayOperation::CreatePrefix
    ) {
        return Ok(());
    }

    let declared = parts
        .headers
        .get(http::header::CONTENT_LENGTH)
        .ok_or_else(|| GatewayError::new(ErrorCode::MissingContentLength))?;
    let declared: usize = declared
        .to_str()
        .ok()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| GatewayError::invalid_argument("invalid Content-Length header"))?;
    if declared != body.len() {
        return Err(GatewayError::with_message(
            ErrorCode::MissingContentLength,
            format!(
                "Content-Length {declared} does not match body length {}",
                body.len()
            ),
        ));
    }

    if operation == GatewayOperation::PutObject
        && !parts.headers.contains_key(http::header::CONTENT_TYPE)
    {
        return Err(GatewayError::invalid_argument(
            "PUT requires a Content-Type header",
        ));
    }

    Ok(())
}
