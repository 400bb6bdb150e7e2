//! Signature verification for the legacy `AWS akid:signature` scheme.
//!
//! The signature is `base64(HMAC-SHA1(secret_key, string_to_sign))`.
//! Comparison against the caller-supplied signature is constant-time.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use hmac::{Hmac, KeyInit, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;
use tracing::debug;

use bucketfs_model::ResolvedAddress;

use crate::canonical;
use crate::credentials::CredentialProvider;
use crate::error::AuthError;

/// The only signing scheme supported by this implementation.
const SUPPORTED_SCHEME: &str = "AWS";

/// Default clock-skew window: 3 minutes.
pub const DEFAULT_MAX_CLOCK_SKEW_SECS: i64 = 180;

type HmacSha1 = Hmac<Sha1>;

/// The result of a successful verification.
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// The access key id that signed the request.
    pub access_key_id: String,
}

/// Parsed components of an `Authorization` header.
///
/// Wire format: `"AWS <access_key_id>:<base64-signature>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAuth {
    /// The access key id.
    pub access_key_id: String,
    /// The base64-encoded signature.
    pub signature: String,
}

/// Parse an `Authorization` header value into its components.
///
/// # Errors
///
/// Returns [`AuthError::UnsupportedScheme`] if the scheme token is not
/// `AWS`, or [`AuthError::InvalidAuthHeader`] if the remainder does not
/// contain exactly one `:` separating a non-empty key id and signature.
pub fn parse_authorization_header(header: &str) -> Result<ParsedAuth, AuthError> {
    let (scheme, rest) = header
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;

    if scheme != SUPPORTED_SCHEME {
        return Err(AuthError::UnsupportedScheme(scheme.to_owned()));
    }

    let mut parts = rest.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(access_key_id), Some(signature), None)
            if !access_key_id.is_empty() && !signature.is_empty() =>
        {
            Ok(ParsedAuth {
                access_key_id: access_key_id.to_owned(),
                signature: signature.to_owned(),
            })
        }
        _ => Err(AuthError::InvalidAuthHeader),
    }
}

/// Compute `base64(HMAC-SHA1(secret_key, string_to_sign))`.
///
/// # Examples
///
/// ```
/// use bucketfs_auth::sigv2::compute_signature;
///
/// let sig = compute_signature(
///     "secret",
///     "GET\n\n\nThu, 01 Jan 2015 00:00:00 GMT\n/bucket/",
/// );
/// assert_eq!(sig, "Obv5DF4aLh9kNpmM3wCSN+1MeIw=");
/// ```
#[must_use]
pub fn compute_signature(secret_key: &str, string_to_sign: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret_key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(string_to_sign.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Validate that a request date is parseable and within the skew window of
/// `now`.
///
/// Accepts RFC 2822 dates (the HTTP `Date` format) and the compact
/// `YYYYMMDDTHHMMSSZ` form used by `X-Amz-Date`.
///
/// # Errors
///
/// Returns [`AuthError::InvalidDate`] for unparseable values, or
/// [`AuthError::RequestTimeTooSkewed`] when outside the window.
pub fn validate_request_time(
    date: &str,
    max_skew: TimeDelta,
    now: DateTime<Utc>,
) -> Result<(), AuthError> {
    let request_time = parse_request_date(date)?;
    if (now - request_time).abs() > max_skew {
        return Err(AuthError::RequestTimeTooSkewed);
    }
    Ok(())
}

/// Parse a request date in either supported format.
fn parse_request_date(date: &str) -> Result<DateTime<Utc>, AuthError> {
    if let Ok(parsed) = DateTime::parse_from_rfc2822(date) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(date, "%Y%m%dT%H%M%SZ")
        .map(|naive| naive.and_utc())
        .map_err(|_| AuthError::InvalidDate(date.to_owned()))
}

/// Verify a signed HTTP request against the credential store.
///
/// This function:
///
/// 1. Parses the `Authorization` header
/// 2. Resolves the secret key for `(bucket, access_key_id)`
/// 3. Validates the request date against the clock-skew window
/// 4. Builds the canonical string to sign
/// 5. Compares signatures using constant-time comparison
///
/// The same logical resource verifies identically whether it was addressed
/// virtual-host style or path style, because the canonical resource comes
/// from the resolved address rather than the raw request.
///
/// # Errors
///
/// Returns an [`AuthError`] if the header is missing or malformed, the
/// bucket or access key is unknown, the date is invalid or skewed, or the
/// signature does not match.
pub fn verify_signed_request(
    parts: &http::request::Parts,
    address: &ResolvedAddress,
    provider: &dyn CredentialProvider,
    max_skew: TimeDelta,
) -> Result<AuthResult, AuthError> {
    let auth_header = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let parsed = parse_authorization_header(auth_header)?;

    debug!(
        access_key_id = %parsed.access_key_id,
        bucket = %address.bucket,
        "verifying request signature"
    );

    let secret_key = provider.secret_key(&address.bucket, &parsed.access_key_id)?;

    let date = canonical::request_date(&parts.headers)?;
    validate_request_time(&date, max_skew, Utc::now())?;

    let resource = address.canonical_resource();
    let string_to_sign = canonical::string_to_sign(&parts.method, &parts.headers, &resource)?;

    debug!(string_to_sign, "built string to sign");

    let expected = compute_signature(&secret_key, &string_to_sign);

    if expected.as_bytes().ct_eq(parsed.signature.as_bytes()).into() {
        Ok(AuthResult {
            access_key_id: parsed.access_key_id,
        })
    } else {
        debug!(
            access_key_id = %parsed.access_key_id,
            "signature mismatch"
        );
        Err(AuthError::SignatureDoesNotMatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredentialProvider;
    use bucketfs_model::AddressingStyle;

    // HMAC-SHA1("secret", "GET\n\n\nThu, 01 Jan 2015 00:00:00 GMT\n/bucket/"),
    // base64-encoded.
    const KNOWN_SIGNATURE: &str = "Obv5DF4aLh9kNpmM3wCSN+1MeIw=";
    const KNOWN_DATE: &str = "Thu, 01 Jan 2015 00:00:00 GMT";

    fn provider() -> StaticCredentialProvider {
        StaticCredentialProvider::new(vec![(
            "bucket".to_owned(),
            "AKID".to_owned(),
            "secret".to_owned(),
        )])
    }

    fn bucket_root() -> ResolvedAddress {
        ResolvedAddress {
            bucket: "bucket".to_owned(),
            key: String::new(),
            style: AddressingStyle::Path,
        }
    }

    fn signed_request(auth: &str, date: &str) -> http::request::Parts {
        let (parts, ()) = http::Request::builder()
            .method("GET")
            .uri("/bucket/")
            .header("date", date)
            .header(http::header::AUTHORIZATION, auth)
            .body(())
            .expect("test request")
            .into_parts();
        parts
    }

    #[test]
    fn test_should_compute_known_signature() {
        let sig = compute_signature("secret", "GET\n\n\nThu, 01 Jan 2015 00:00:00 GMT\n/bucket/");
        assert_eq!(sig, KNOWN_SIGNATURE);
    }

    #[test]
    fn test_should_change_signature_when_canonical_string_changes() {
        let base = compute_signature("secret", "GET\n\n\nThu, 01 Jan 2015 00:00:00 GMT\n/bucket/");
        let trailing =
            compute_signature("secret", "GET\n\n\nThu, 01 Jan 2015 00:00:00 GMT\n/bucket/\n");
        assert_ne!(base, trailing);
    }

    #[test]
    fn test_should_parse_authorization_header() {
        let parsed = parse_authorization_header("AWS AKID:c2ln").unwrap();
        assert_eq!(parsed.access_key_id, "AKID");
        assert_eq!(parsed.signature, "c2ln");
    }

    #[test]
    fn test_should_reject_missing_scheme_separator() {
        assert!(matches!(
            parse_authorization_header("AWSAKID:c2ln"),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            parse_authorization_header("AWS-AKID-sig"),
            Err(AuthError::InvalidAuthHeader)
        ));
    }

    #[test]
    fn test_should_reject_unsupported_scheme() {
        assert!(matches!(
            parse_authorization_header("AWS4-HMAC-SHA256 AKID:sig"),
            Err(AuthError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_should_reject_wrong_colon_count() {
        assert!(matches!(
            parse_authorization_header("AWS AKID"),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            parse_authorization_header("AWS AKID:sig:extra"),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            parse_authorization_header("AWS :sig"),
            Err(AuthError::InvalidAuthHeader)
        ));
    }

    #[test]
    fn test_should_accept_date_within_skew_window() {
        let now = Utc::now();
        let date = now.to_rfc2822();
        assert!(validate_request_time(&date, TimeDelta::seconds(180), now).is_ok());
    }

    #[test]
    fn test_should_reject_date_outside_skew_window() {
        let now = Utc::now();
        let stale = (now - TimeDelta::seconds(600)).to_rfc2822();
        assert!(matches!(
            validate_request_time(&stale, TimeDelta::seconds(180), now),
            Err(AuthError::RequestTimeTooSkewed)
        ));
    }

    #[test]
    fn test_should_reject_unparseable_date() {
        assert!(matches!(
            validate_request_time("not a date", TimeDelta::seconds(180), Utc::now()),
            Err(AuthError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_should_parse_compact_amz_date_format() {
        assert!(parse_request_date("20150101T000000Z").is_ok());
    }

    #[test]
    fn test_should_verify_correctly_signed_request() {
        // Use a fresh date so the skew check passes; recompute the matching
        // signature for it.
        let date = Utc::now().to_rfc2822();
        let string_to_sign = format!("GET\n\n\n{date}\n/bucket/");
        let signature = compute_signature("secret", &string_to_sign);
        let parts = signed_request(&format!("AWS AKID:{signature}"), &date);

        let result = verify_signed_request(
            &parts,
            &bucket_root(),
            &provider(),
            TimeDelta::seconds(DEFAULT_MAX_CLOCK_SKEW_SECS),
        )
        .unwrap();
        assert_eq!(result.access_key_id, "AKID");
    }

    #[test]
    fn test_should_reject_tampered_signature() {
        let date = Utc::now().to_rfc2822();
        let parts = signed_request(&format!("AWS AKID:{KNOWN_SIGNATURE}"), &date);

        let result = verify_signed_request(
            &parts,
            &bucket_root(),
            &provider(),
            TimeDelta::seconds(DEFAULT_MAX_CLOCK_SKEW_SECS),
        );
        assert!(matches!(result, Err(AuthError::SignatureDoesNotMatch)));
    }

    #[test]
    fn test_should_reject_stale_request_before_signature_check() {
        let parts = signed_request(&format!("AWS AKID:{KNOWN_SIGNATURE}"), KNOWN_DATE);

        let result = verify_signed_request(
            &parts,
            &bucket_root(),
            &provider(),
            TimeDelta::seconds(DEFAULT_MAX_CLOCK_SKEW_SECS),
        );
        assert!(matches!(result, Err(AuthError::RequestTimeTooSkewed)));
    }

    #[test]
    fn test_should_surface_unknown_bucket_vs_unknown_access_key() {
        let date = Utc::now().to_rfc2822();
        let parts = signed_request("AWS NOPE:c2ln", &date);

        let unknown_key = verify_signed_request(
            &parts,
            &bucket_root(),
            &provider(),
            TimeDelta::seconds(DEFAULT_MAX_CLOCK_SKEW_SECS),
        );
        assert!(matches!(unknown_key, Err(AuthError::AccessKeyNotFound(_))));

        let other_bucket = ResolvedAddress {
            bucket: "ghost".to_owned(),
            key: String::new(),
            style: AddressingStyle::Path,
        };
        let unknown_bucket = verify_signed_request(
            &parts,
            &other_bucket,
            &provider(),
            TimeDelta::seconds(DEFAULT_MAX_CLOCK_SKEW_SECS),
        );
        assert!(matches!(unknown_bucket, Err(AuthError::UnknownBucket(_))));
    }

    #[test]
    fn test_should_fail_without_auth_header() {
        let (parts, ()) = http::Request::builder()
            .method("GET")
            .uri("/bucket/")
            .header("date", KNOWN_DATE)
            .body(())
            .expect("test request")
            .into_parts();

        let result = verify_signed_request(
            &parts,
            &bucket_root(),
            &provider(),
            TimeDelta::seconds(DEFAULT_MAX_CLOCK_SKEW_SECS),
        );
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }
}
