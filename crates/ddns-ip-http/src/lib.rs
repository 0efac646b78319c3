// # HTTP IP Resolver
//
// This crate provides an HTTP-based public IP resolver for the DDNS client.
//
// ## Contract
//
// Any endpoint that answers a plain GET with the caller's public IP as the
// entire response body works (e.g. ipify, ifconfig.me, icanhazip). Each call to
// `resolve()` issues exactly one request; retrying is the reconciler's job.
//
// The body is trimmed and must parse as an IPv4/IPv6 literal. HTML error
// pages, empty bodies and addresses of the wrong family are rejected with
// `Error::InvalidIp` so they never reach a DNS record.

use ddns_core::traits::{IpResolver, IpVersion};
use ddns_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default HTTP timeout for IP lookups
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public IP resolver
#[derive(Debug, Clone)]
pub struct HttpIpResolver {
    /// URL to fetch IP from
    url: String,

    /// Accepted IP family (None = both)
    version: Option<IpVersion>,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a new HTTP IP resolver
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://api.ipify.org")
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            version: None,
            client,
        })
    }

    /// Only accept addresses of the given family
    pub fn with_version(mut self, version: Option<IpVersion>) -> Self {
        self.version = version;
        self
    }

    /// The endpoint this resolver queries
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parse a response body into an IP address
    fn parse_body(&self, body: &str) -> Result<IpAddr> {
        let ip_text = body.trim();

        let ip: IpAddr = ip_text
            .parse()
            .map_err(|_| Error::invalid_ip(format!("{:?} from {}", ip_text, self.url)))?;

        if let Some(version) = self.version
            && !version.matches(&ip)
        {
            return Err(Error::invalid_ip(format!(
                "Expected {:?} address, got {} from {}",
                version, ip, self.url
            )));
        }

        Ok(ip)
    }
}

#[async_trait::async_trait]
impl IpResolver for HttpIpResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        tracing::debug!("Fetching public IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::network(format!(
                "{} answered HTTP {}",
                self.url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read response from {}: {}", self.url, e)))?;

        self.parse_body(&body)
    }
}
