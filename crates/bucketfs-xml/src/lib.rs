//! S3-shaped XML serialization for bucketfs responses.
//!
//! The gateway speaks the AWS S3 RestXml conventions:
//!
//! - Namespace: `http://s3.amazonaws.com/doc/2006-03-01/`
//! - Timestamps: ISO 8601 (`2006-02-03T16:45:09.000Z`)
//! - XML declaration: `<?xml version="1.0" encoding="UTF-8"?>`
//!
//! Two documents are produced: `ListBucketResult` for listings and `Error`
//! for every failed request.

pub mod error;
pub mod serialize;

pub use error::XmlError;
pub use serialize::{ErrorDocument, ListBucketResult, XmlSerialize, to_xml};
