//! Gateway configuration.
//!
//! Provides [`GatewayConfig`], loaded from environment variables with
//! sensible defaults. There is no ambient global: the configuration object
//! is constructed at startup and passed by reference into the components
//! that need it.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Gateway configuration.
///
/// # Examples
///
/// ```
/// use bucketfs_core::config::GatewayConfig;
///
/// let config = GatewayConfig::default();
/// assert_eq!(config.gateway_listen, "0.0.0.0:9000");
/// assert_eq!(config.max_clock_skew_secs, 180);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Bind address for the gateway (e.g. `"0.0.0.0:9000"`).
    #[builder(default = String::from("0.0.0.0:9000"))]
    pub gateway_listen: String,

    /// Data directory holding one subdirectory per bucket.
    #[builder(default = String::from("/var/lib/bucketfs"))]
    pub data_dir: String,

    /// Whether virtual-hosted-style bucket addressing is enabled.
    #[builder(default = true)]
    pub virtual_hosting: bool,

    /// Domain suffix for virtual hosting resolution (a request to
    /// `mybucket.<suffix>` addresses `mybucket`).
    #[builder(default = String::from("s3.localhost"))]
    pub virtual_host_suffix: String,

    /// Whether to skip signature validation on incoming requests.
    #[builder(default = false)]
    pub skip_signature_validation: bool,

    /// Maximum allowed clock skew between the request date and server time,
    /// in seconds.
    #[builder(default = 180)]
    pub max_clock_skew_secs: i64,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            gateway_listen: String::from("0.0.0.0:9000"),
            data_dir: String::from("/var/lib/bucketfs"),
            virtual_hosting: true,
            virtual_host_suffix: String::from("s3.localhost"),
            skip_signature_validation: false,
            max_clock_skew_secs: 180,
            log_level: String::from("info"),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables (falling back to defaults):
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GATEWAY_LISTEN` | `0.0.0.0:9000` |
    /// | `DATA_DIR` | `/var/lib/bucketfs` |
    /// | `VIRTUAL_HOSTING` | `true` |
    /// | `VIRTUAL_HOST_SUFFIX` | `s3.localhost` |
    /// | `SKIP_SIGNATURE_VALIDATION` | `false` |
    /// | `MAX_CLOCK_SKEW_SECS` | `180` |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Ok(v) = std::env::var("DATA_DIR") {
            config.data_dir = v;
        }
        if let Ok(v) = std::env::var("VIRTUAL_HOSTING") {
            config.virtual_hosting = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("VIRTUAL_HOST_SUFFIX") {
            config.virtual_host_suffix = v;
        }
        if let Ok(v) = std::env::var("SKIP_SIGNATURE_VALIDATION") {
            config.skip_signature_validation = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("MAX_CLOCK_SKEW_SECS")
            && let Ok(n) = v.parse::<i64>()
        {
            config.max_clock_skew_secs = n;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.gateway_listen, "0.0.0.0:9000");
        assert_eq!(config.data_dir, "/var/lib/bucketfs");
        assert!(config.virtual_hosting);
        assert_eq!(config.virtual_host_suffix, "s3.localhost");
        assert!(!config.skip_signature_validation);
        assert_eq!(config.max_clock_skew_secs, 180);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_should_build_with_typed_builder() {
        let config = GatewayConfig::builder()
            .gateway_listen("127.0.0.1:9999".into())
            .data_dir("/tmp/buckets".into())
            .virtual_hosting(false)
            .virtual_host_suffix("storage.example".into())
            .skip_signature_validation(true)
            .max_clock_skew_secs(60)
            .log_level("debug".into())
            .build();

        assert_eq!(config.gateway_listen, "127.0.0.1:9999");
        assert_eq!(config.data_dir, "/tmp/buckets");
        assert!(!config.virtual_hosting);
        assert_eq!(config.virtual_host_suffix, "storage.example");
        assert!(config.skip_signature_validation);
        assert_eq!(config.max_clock_skew_secs, 60);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_should_serialize_to_camel_case_json() {
        let config = GatewayConfig::default();
        let json = serde_json::to_string(&config).expect("test serialization");
        assert!(json.contains("gatewayListen"));
        assert!(json.contains("virtualHostSuffix"));
    }

    #[test]
    fn test_should_parse_bool_values() {
        assert!(parse_bool("1"));
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }
}
