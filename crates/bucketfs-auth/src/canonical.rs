//! Canonical string-to-sign construction.
//!
//! The string to sign is the ordered concatenation:
//!
//! ```text
//! <method>\n
//! <content-md5>\n
//! <content-type>\n
//! <date>\n
//! <canonicalized-amz-headers><canonical-resource>
//! ```
//!
//! Header canonicalization is case-insensitive on header names, stably
//! sorted by lowercased name, with multiple values for the same name joined
//! by `,` on one line. The canonical resource is the literal `/bucket/key`
//! path regardless of the addressing style the client used, and is not
//! URL-decoded a second time.
//!
//! All functions here are pure over the request headers.

use std::collections::BTreeMap;

use http::{HeaderMap, Method};

use crate::error::AuthError;

/// Vendor header prefix included in the canonical string.
pub const AMZ_HEADER_PREFIX: &str = "x-amz-";

/// The primary request date header.
pub const DATE_HEADER: &str = "date";

/// The alternate date header, consulted when `Date` is absent.
pub const ALT_DATE_HEADER: &str = "x-amz-date";

/// Extract the request date from `Date`, falling back to `X-Amz-Date`.
///
/// # Errors
///
/// Returns [`AuthError::MissingDateHeader`] if neither header is present, or
/// [`AuthError::InvalidDate`] if the value is not valid UTF-8.
pub fn request_date(headers: &HeaderMap) -> Result<String, AuthError> {
    for name in [DATE_HEADER, ALT_DATE_HEADER] {
        if let Some(value) = headers.get(name) {
            return value
                .to_str()
                .map(ToOwned::to_owned)
                .map_err(|_| AuthError::InvalidDate(format!("{name} is not valid UTF-8")));
        }
    }
    Err(AuthError::MissingDateHeader)
}

/// Render the canonicalized `x-amz-*` header block.
///
/// One line per distinct lowercased header name, sorted lexicographically,
/// each rendered as `name:value\n`. Multiple values for the same name are
/// joined with `,` in the order they appear in the header map.
#[must_use]
pub fn canonicalized_amz_headers(headers: &HeaderMap) -> String {
    // HeaderName is lowercase by construction, so grouping by name is
    // already case-insensitive; the BTreeMap gives the stable sort.
    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (name, value) in headers {
        if name.as_str().starts_with(AMZ_HEADER_PREFIX)
            && let Ok(v) = value.to_str()
        {
            grouped.entry(name.as_str()).or_default().push(v.trim());
        }
    }

    let mut out = String::new();
    for (name, values) in grouped {
        out.push_str(name);
        out.push(':');
        out.push_str(&values.join(","));
        out.push('\n');
    }
    out
}

/// Build the canonical string to sign for a request.
///
/// `resource` is the canonical resource path (`/bucket/key`), typically
/// produced by `ResolvedAddress::canonical_resource`.
///
/// # Errors
///
/// Returns [`AuthError::MissingDateHeader`] if the request carries neither
/// `Date` nor `X-Amz-Date`.
///
/// # Examples
///
/// ```
/// use bucketfs_auth::canonical::string_to_sign;
///
/// let mut headers = http::HeaderMap::new();
/// headers.insert("date", "Thu, 01 Jan 2015 00:00:00 GMT".parse().unwrap());
/// let s = string_to_sign(&http::Method::GET, &headers, "/bucket/").unwrap();
/// assert_eq!(s, "GET\n\n\nThu, 01 Jan 2015 00:00:00 GMT\n/bucket/");
/// ```
pub fn string_to_sign(
    method: &Method,
    headers: &HeaderMap,
    resource: &str,
) -> Result<String, AuthError> {
    let content_md5 = header_or_empty(headers, "content-md5");
    let content_type = header_or_empty(headers, "content-type");
    let date = request_date(headers)?;
    let amz_headers = canonicalized_amz_headers(headers);

    Ok(format!(
        "{method}\n{content_md5}\n{content_type}\n{date}\n{amz_headers}{resource}"
    ))
}

/// Read a header value as a string, defaulting to empty when absent or not
/// valid UTF-8.
fn header_or_empty<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
