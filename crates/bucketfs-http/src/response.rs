//! HTTP response builders for the gateway.
//!
//! Small helpers for the response shapes the service produces: raw object
//! content, XML documents, empty statuses, and the XML error document every
//! failed request is rendered as. Common headers (`x-amz-request-id`,
//! `Server`, `Date`) are stamped on every response in one place so handlers
//! never deal with them.

use chrono::Utc;
use http::header::HeaderValue;
use http::{Response, StatusCode};
use tracing::error;

use bucketfs_model::GatewayError;
use bucketfs_xml::{ErrorDocument, to_xml};

use crate::body::GatewayBody;

/// The `Server` header value stamped on every response.
const SERVER_NAME: &str = "bucketfs";

/// Build a 200 response carrying an XML document.
#[must_use]
pub fn xml_response(xml: Vec<u8>) -> Response<GatewayBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/xml")
        .body(GatewayBody::from_xml(xml))
        .unwrap_or_else(|_| fallback_response())
}

/// Build a 200 response carrying raw object content.
#[must_use]
pub fn object_response(
    data: impl Into<bytes::Bytes>,
    etag: &str,
) -> Response<GatewayBody> {
    let data = data.into();
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Length", data.len())
        .header("Content-Type", "application/octet-stream")
        .header("ETag", format!("\"{etag}\""))
        .body(GatewayBody::from_bytes(data))
        .unwrap_or_else(|_| fallback_response())
}

/// Build an empty response with the given status.
#[must_use]
pub fn empty_response(status: StatusCode) -> Response<GatewayBody> {
    Response::builder()
        .status(status)
        .body(GatewayBody::empty())
        .unwrap_or_else(|_| fallback_response())
}

/// Render a [`GatewayError`] as an XML error response.
///
/// `resource` is the canonical resource path of the failing request, used in
/// the `<Resource>` element.
#[must_use]
pub fn error_to_response(
    err: &GatewayError,
    resource: &str,
    request_id: &str,
) -> Response<GatewayBody> {
    let doc = ErrorDocument {
        code: err.code.as_str(),
        message: &err.message,
        resource,
        request_id,
    };
    let body = match to_xml("Error", &doc) {
        Ok(xml) => GatewayBody::from_xml(xml),
        Err(xml_err) => {
            error!(error = %xml_err, request_id, "failed to serialize error document");
            GatewayBody::empty()
        }
    };

    Response::builder()
        .status(err.status_code())
        .header("Content-Type", "application/xml")
        .body(body)
        .unwrap_or_else(|_| fallback_response())
}

/// Stamp the headers every response carries.
#[must_use]
pub fn add_common_headers(
    mut response: Response<GatewayBody>,
    request_id: &str,
) -> Response<GatewayBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = HeaderValue::from_str(request_id) {
        headers.insert("x-amz-request-id", hv);
    }
    headers.insert("Server", HeaderValue::from_static(SERVER_NAME));

    let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
    if let Ok(hv) = HeaderValue::from_str(&date) {
        headers.insert("Date", hv);
    }

    response
}

/// Last-resort empty 500 when a response builder fails.
fn fallback_response() -> Response<GatewayBody> {
    let mut response = Response::new(GatewayBody::empty());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
