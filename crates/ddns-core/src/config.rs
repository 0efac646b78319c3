//! Configuration for the DDNS client
//!
//! The configuration is a single JSON document read once at startup. Keys use
//! the PascalCase names of the historical file format (`ApiToken`, `ZoneId`,
//! `FullQualifiedDomainName`, ...); snake_case aliases are accepted as well.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Cloudflare API v4 base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Main DDNS configuration
///
/// Immutable once loaded; the reconciler owns it for the process lifetime.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DdnsConfig {
    /// Bearer credential for the provider API
    #[serde(alias = "api_token")]
    pub api_token: String,

    /// Zone identifier the record lives in
    #[serde(alias = "zone_id")]
    pub zone_id: String,

    /// Fully-qualified domain name of the managed record
    #[serde(rename = "FullQualifiedDomainName", alias = "record_name")]
    pub record_name: String,

    /// DNS record type (e.g. "A" or "AAAA")
    #[serde(rename = "DnsType", alias = "record_type")]
    pub record_type: String,

    /// Record TTL in seconds (1 means "automatic" on Cloudflare)
    #[serde(alias = "ttl")]
    pub ttl: u32,

    /// Record priority
    #[serde(alias = "priority")]
    pub priority: u16,

    /// Route traffic through the provider's proxy
    #[serde(alias = "proxied")]
    pub proxied: bool,

    /// Polling interval in seconds
    #[serde(rename = "Interval", alias = "interval_secs")]
    pub interval_secs: u64,

    /// Plain-text "what is my IP" endpoint
    #[serde(rename = "GetIpApi", alias = "ip_api_url")]
    pub ip_api_url: String,

    /// Provider API base URL
    #[serde(default = "default_api_base_url", alias = "api_base_url")]
    pub api_base_url: String,

    /// Fixed delay between failed IP resolutions, in seconds
    #[serde(
        rename = "ResolveRetryDelay",
        default = "default_resolve_retry_delay_secs",
        alias = "resolve_retry_delay_secs"
    )]
    pub resolve_retry_delay_secs: u64,

    /// Skip the provider call when the IP equals the last applied content
    #[serde(default, alias = "skip_unchanged")]
    pub skip_unchanged: bool,

    /// Capacity of the reconcile event channel
    #[serde(default = "default_event_channel_capacity", alias = "event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl DdnsConfig {
    /// Create a configuration with the required fields and defaults for the rest
    pub fn new(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        record_name: impl Into<String>,
        ip_api_url: impl Into<String>,
    ) -> Self {
        Self {
            api_token: api_token.into(),
            zone_id: zone_id.into(),
            record_name: record_name.into(),
            record_type: "A".to_string(),
            ttl: 1,
            priority: 10,
            proxied: false,
            interval_secs: 300,
            ip_api_url: ip_api_url.into(),
            api_base_url: default_api_base_url(),
            resolve_retry_delay_secs: default_resolve_retry_delay_secs(),
            skip_unchanged: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Load the configuration from a JSON file
    ///
    /// A missing or unreadable file, malformed JSON, or an absent required key
    /// is reported as [`Error::Config`] naming the path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
            .map_err(|e| Error::config(format!("Failed to parse config file {}: {}", path.display(), e)))
    }

    /// Parse the configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Validate the configuration
    ///
    /// Every required field must be non-empty; deserialization already
    /// rejects absent keys.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("ApiToken", &self.api_token),
            ("ZoneId", &self.zone_id),
            ("FullQualifiedDomainName", &self.record_name),
            ("DnsType", &self.record_type),
            ("GetIpApi", &self.ip_api_url),
            ("ApiBaseUrl", &self.api_base_url),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::config(format!("{} cannot be empty", key)));
            }
        }

        if self.interval_secs == 0 {
            return Err(Error::config("Interval must be > 0"));
        }

        if self.ttl == 0 {
            return Err(Error::config("Ttl must be > 0"));
        }

        if self.event_channel_capacity == 0 {
            return Err(Error::config("EventChannelCapacity must be > 0"));
        }

        for (key, url) in [("GetIpApi", &self.ip_api_url), ("ApiBaseUrl", &self.api_base_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::config(format!(
                    "{} must use HTTP or HTTPS scheme. Got: {}",
                    key, url
                )));
            }
        }

        Ok(())
    }

    /// Polling interval as a duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Delay between failed IP resolutions
    pub fn resolve_retry_delay(&self) -> Duration {
        Duration::from_secs(self.resolve_retry_delay_secs)
    }
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("record_name", &self.record_name)
            .field("record_type", &self.record_type)
            .field("ttl", &self.ttl)
            .field("priority", &self.priority)
            .field("proxied", &self.proxied)
            .field("interval_secs", &self.interval_secs)
            .field("ip_api_url", &self.ip_api_url)
            .field("api_base_url", &self.api_base_url)
            .field("resolve_retry_delay_secs", &self.resolve_retry_delay_secs)
            .field("skip_unchanged", &self.skip_unchanged)
            .field("event_channel_capacity", &self.event_channel_capacity)
            .finish()
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_resolve_retry_delay_secs() -> u64 {
    1
}

fn default_event_channel_capacity() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "ApiToken": "secret-token",
        "DnsType": "A",
        "FullQualifiedDomainName": "home.example.com",
        "Ttl": 120,
        "Priority": 10,
        "Proxied": false,
        "ZoneId": "023e105f4ecef8ad9ca31a8372d0c353",
        "Interval": 300,
        "GetIpApi": "https://api.ipify.org"
    }"#;

    #[test]
    fn parses_original_file_format() {
        let config = DdnsConfig::from_json(SAMPLE).unwrap();

        assert_eq!(config.api_token, "secret-token");
        assert_eq!(config.record_name, "home.example.com");
        assert_eq!(config.record_type, "A");
        assert_eq!(config.ttl, 120);
        assert_eq!(config.interval(), Duration::from_secs(300));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.resolve_retry_delay(), Duration::from_secs(1));
        assert!(!config.skip_unchanged);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn accepts_snake_case_keys() {
        let json = r#"{
            "api_token": "t", "zone_id": "z", "record_name": "a.example.com",
            "record_type": "AAAA", "ttl": 1, "priority": 0, "proxied": true,
            "interval_secs": 60, "ip_api_url": "https://api6.ipify.org",
            "skip_unchanged": true
        }"#;
        let config = DdnsConfig::from_json(json).unwrap();

        assert_eq!(config.record_type, "AAAA");
        assert!(config.proxied);
        assert!(config.skip_unchanged);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_key_is_rejected() {
        let json = SAMPLE.replace(r#""ZoneId": "023e105f4ecef8ad9ca31a8372d0c353","#, "");
        assert!(DdnsConfig::from_json(&json).is_err());
    }

    #[test]
    fn empty_values_fail_validation() {
        let mut config = DdnsConfig::from_json(SAMPLE).unwrap();
        config.zone_id = String::new();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("ZoneId")));

        let mut config = DdnsConfig::from_json(SAMPLE).unwrap();
        config.interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = DdnsConfig::from_json(SAMPLE).unwrap();
        config.ttl = 0;
        assert!(config.validate().is_err());

        let mut config = DdnsConfig::from_json(SAMPLE).unwrap();
        config.ip_api_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_file_reads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = DdnsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.zone_id, "023e105f4ecef8ad9ca31a8372d0c353");
    }

    #[test]
    fn from_file_missing_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let err = DdnsConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("config.json")));
    }

    #[test]
    fn from_file_malformed_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = DdnsConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn debug_hides_api_token() {
        let config = DdnsConfig::from_json(SAMPLE).unwrap();
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("secret-token"));
        assert!(debug_str.contains("home.example.com"));
        assert!(debug_str.contains("event_channel_capacity: 100"));
    }

    #[test]
    fn from_json_malformed_is_json_error() {
        assert!(matches!(DdnsConfig::from_json("{ not json"), Err(Error::Json(_))));
    }
}
