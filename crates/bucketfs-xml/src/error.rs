//! Error types for XML serialization.

/// Errors that can occur while writing XML documents.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// The underlying XML writer failed.
    #[error("XML write error: {0}")]
    Write(#[from] quick_xml::Error),

    /// An I/O error occurred while writing element content.
    #[error("XML I/O error: {0}")]
    Io(#[from] std::io::Error),
}
