//! XML document writers for gateway responses.
//!
//! Provides the [`XmlSerialize`] trait and the two documents the gateway
//! emits: [`ListBucketResult`] and [`ErrorDocument`]. Implementors write
//! their content as child elements inside the current XML context; the root
//! element name and namespace are handled by the top-level [`to_xml`]
//! function.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesText, Event};

use bucketfs_model::ListingResult;

use crate::error::XmlError;

/// The S3 XML namespace.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

/// The maximum key count reported in listing responses. Pagination is not
/// supported, so every response reports this bound and `IsTruncated=false`.
const MAX_KEYS: usize = 1000;

/// Trait for serializing gateway types to XML.
///
/// Uses `io::Result` because `quick_xml::Writer` closures require
/// `io::Result<()>`.
pub trait XmlSerialize {
    /// Serialize this value as XML child elements into the given writer.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if writing to the underlying writer fails.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// Serialize a value as a complete S3-compatible XML document with
/// declaration and namespace.
///
/// # Errors
///
/// Returns [`XmlError`] if serialization fails.
pub fn to_xml<T: XmlSerialize>(root_element: &str, value: &T) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(quick_xml::events::BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        None,
    )))?;

    writer
        .create_element(root_element)
        .with_attribute(("xmlns", S3_NAMESPACE))
        .write_inner_content(|w| value.serialize_xml(w))?;

    Ok(buf)
}

/// Write a simple `<tag>text</tag>` element.
fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// Format a timestamp as S3's ISO 8601 flavor: `2006-02-03T16:45:09.000Z`.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// The `ListBucketResult` document for a ListObjects response.
#[derive(Debug, Clone)]
pub struct ListBucketResult<'a> {
    /// The bucket name.
    pub name: &'a str,
    /// The requested prefix (possibly empty).
    pub prefix: &'a str,
    /// The requested delimiter (possibly empty; omitted from the document
    /// when empty).
    pub delimiter: &'a str,
    /// The listing produced by the engine.
    pub listing: &'a ListingResult,
}

impl XmlSerialize for ListBucketResult<'_> {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Name", self.name)?;
        write_text_element(writer, "Prefix", self.prefix)?;
        if !self.delimiter.is_empty() {
            write_text_element(writer, "Delimiter", self.delimiter)?;
        }
        write_text_element(writer, "KeyCount", &self.listing.objects.len().to_string())?;
        write_text_element(writer, "MaxKeys", &MAX_KEYS.to_string())?;
        write_text_element(writer, "IsTruncated", "false")?;

        for object in &self.listing.objects {
            writer.create_element("Contents").write_inner_content(|w| {
                write_text_element(w, "Key", &object.key)?;
                write_text_element(w, "LastModified", &format_timestamp(object.last_modified))?;
                write_text_element(w, "ETag", &format!("\"{}\"", object.etag))?;
                write_text_element(w, "Size", &object.size.to_string())?;
                write_text_element(w, "StorageClass", "STANDARD")
            })?;
        }

        for prefix in &self.listing.common_prefixes {
            writer
                .create_element("CommonPrefixes")
                .write_inner_content(|w| write_text_element(w, "Prefix", prefix))?;
        }

        Ok(())
    }
}

/// The `Error` document rendered for every failed request.
#[derive(Debug, Clone)]
pub struct ErrorDocument<'a> {
    /// The S3 error code string.
    pub code: &'a str,
    /// The human-readable message.
    pub message: &'a str,
    /// The resource path the request addressed.
    pub resource: &'a str,
    /// The id stamped on the response for correlation.
    pub request_id: &'a str,
}

impl XmlSerialize for ErrorDocument<'_> {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "Code", self.code)?;
        write_text_element(writer, "Message", self.message)?;
        write_text_element(writer, "Resource", self.resource)?;
        write_text_element(writer, "RequestId", self.request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bucketfs_model::ObjectMeta;
    use chrono::TimeZone;

    fn listing() -> ListingResult {
        let mut result = ListingResult::default();
        result.objects.push(ObjectMeta {
            key: "d.txt".to_owned(),
            size: 1,
            last_modified: Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap(),
            etag: "8277e0910d750195b448797616e091ad".to_owned(),
        });
        result.common_prefixes.insert("a/".to_owned());
        result
    }

    fn render(doc: &ListBucketResult<'_>) -> String {
        String::from_utf8(to_xml("ListBucketResult", doc).expect("serialize")).expect("utf8")
    }

    #[test]
    fn test_should_serialize_list_bucket_result() {
        let listing = listing();
        let doc = ListBucketResult {
            name: "mybucket",
            prefix: "",
            delimiter: "/",
            listing: &listing,
        };
        let xml = render(&doc);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\""));
        assert!(xml.contains("<Name>mybucket</Name>"));
        assert!(xml.contains("<Delimiter>/</Delimiter>"));
        assert!(xml.contains("<KeyCount>1</KeyCount>"));
        assert!(xml.contains("<MaxKeys>1000</MaxKeys>"));
        assert!(xml.contains("<IsTruncated>false</IsTruncated>"));
        assert!(xml.contains("<Key>d.txt</Key>"));
        assert!(xml.contains("<LastModified>2015-01-01T00:00:00.000Z</LastModified>"));
        assert!(xml.contains("<ETag>&quot;8277e0910d750195b448797616e091ad&quot;</ETag>"));
        assert!(xml.contains("<Size>1</Size>"));
        assert!(xml.contains("<StorageClass>STANDARD</StorageClass>"));
        assert!(xml.contains("<CommonPrefixes><Prefix>a/</Prefix></CommonPrefixes>"));
    }

    #[test]
    fn test_should_omit_empty_delimiter() {
        let listing = listing();
        let doc = ListBucketResult {
            name: "mybucket",
            prefix: "a/",
            delimiter: "",
            listing: &listing,
        };
        let xml = render(&doc);
        assert!(!xml.contains("<Delimiter>"));
        assert!(xml.contains("<Prefix>a/</Prefix>"));
    }

    #[test]
    fn test_should_serialize_error_document() {
        let doc = ErrorDocument {
            code: "NoSuchKey",
            message: "The specified key does not exist",
            resource: "/mybucket/ghost.txt",
            request_id: "req-1234",
        };
        let xml =
            String::from_utf8(to_xml("Error", &doc).expect("serialize")).expect("utf8");
        assert!(xml.contains("<Code>NoSuchKey</Code>"));
        assert!(xml.contains("<Message>The specified key does not exist</Message>"));
        assert!(xml.contains("<Resource>/mybucket/ghost.txt</Resource>"));
        assert!(xml.contains("<RequestId>req-1234</RequestId>"));
    }
}
