//! Gateway response body supporting buffered and empty modes.
//!
//! [`GatewayBody`] is the HTTP response body type used throughout the
//! service. Buffered covers object content, XML payloads, and error bodies;
//! Empty covers 204 responses. Objects are read fully into memory before
//! they are served, so a streaming variant is not needed yet.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::Full;

/// Response body of the gateway.
///
/// Implements [`http_body::Body`] so it can be used directly with hyper
/// responses.
#[derive(Debug, Default)]
pub enum GatewayBody {
    /// Buffered body: object content, XML payloads, error documents.
    Buffered(Full<Bytes>),
    /// Empty body for 204 responses.
    #[default]
    Empty,
}

impl GatewayBody {
    /// Create a buffered body from bytes.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::Buffered(Full::new(data.into()))
    }

    /// Create an empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Create a buffered body from an XML byte vector.
    #[must_use]
    pub fn from_xml(xml: Vec<u8>) -> Self {
        Self::Buffered(Full::new(Bytes::from(xml)))
    }
}

impl http_body::Body for GatewayBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Buffered(full) => Pin::new(full)
                .poll_frame(cx)
                .map_err(|never| match never {}),
            Self::Empty => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Buffered(full) => full.is_end_stream(),
            Self::Empty => true,
        }
    }

    fn size_hint(&self) -> http_body::SizeHint {
        match self {
            Self::Buffered(full) => full.size_hint(),
            Self::Empty => http_body::SizeHint::with_exact(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body::Body;

    use super::*;

    #[test]
    fn test_should_report_empty_body_as_end_of_stream() {
        let body = GatewayBody::empty();
        assert!(body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(0));
    }

    #[test]
    fn test_should_create_buffered_body_from_bytes() {
        let body = GatewayBody::from_bytes(Bytes::from("hello"));
        assert!(!body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(5));
    }

    #[test]
    fn test_should_create_buffered_body_from_xml() {
        let xml = b"<Root><Key>value</Key></Root>".to_vec();
        let body = GatewayBody::from_xml(xml);
        assert!(!body.is_end_stream());
    }

    #[test]
    fn test_should_default_to_empty() {
        let body = GatewayBody::default();
        assert!(body.is_end_stream());
    }
}
