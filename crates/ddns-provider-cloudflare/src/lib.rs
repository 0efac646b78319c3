// # Cloudflare DNS Record Service
//
// This crate implements `DnsRecordService` on top of the Cloudflare API v4.
//
// ## Behavior
//
// - One logical operation per call (listing may span several pages)
// - Every failure is returned to the reconciler; nothing is retried here
// - A non-2xx status or a `"success": false` envelope is a provider error
//   carrying the raw response body
// - HTTP timeout configured (30 seconds)
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Construction fails if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records?page=N&per_page=100`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::DEFAULT_API_BASE_URL;
use ddns_core::traits::DnsRecordService;
use ddns_core::{DnsRecord, Error, RecordRequest, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Records requested per list page
const PAGE_SIZE: u32 = 100;

const PROVIDER_NAME: &str = "cloudflare";

/// Cloudflare response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Option<Vec<ApiMessage>>,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: Option<u32>,
}

/// Cloudflare DNS provider
///
/// Stateless between calls: the zone and record ids come from the caller.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL (overridable for testing)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            client,
        })
    }

    /// Use a different API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, zone_id)
    }

    /// Send a request and unwrap the response envelope
    ///
    /// Headers are attached before the body so `json()` does not add a
    /// second Content-Type. Any failure past the transport keeps the raw
    /// body for diagnosis.
    async fn call<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        body: Option<&RecordRequest>,
        operation: &str,
    ) -> Result<Envelope<T>> {
        let mut request = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::network(format!("Cloudflare {} request failed: {}", operation, e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::network(format!("Failed to read Cloudflare {} response: {}", operation, e))
        })?;

        if !status.is_success() {
            return Err(Error::provider(PROVIDER_NAME, Some(status.as_u16()), body));
        }

        let envelope: Envelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("Unparseable Cloudflare {} response: {}", operation, e);
                return Err(Error::provider(PROVIDER_NAME, Some(status.as_u16()), body));
            }
        };

        if !envelope.success {
            for error in envelope.errors.iter().flatten() {
                tracing::debug!("Cloudflare {} error {}: {}", operation, error.code, error.message);
            }
            return Err(Error::provider(PROVIDER_NAME, Some(status.as_u16()), body));
        }

        Ok(envelope)
    }

    async fn call_for_record(
        &self,
        request: reqwest::RequestBuilder,
        body: &RecordRequest,
        operation: &str,
    ) -> Result<DnsRecord> {
        self.call::<DnsRecord>(request, Some(body), operation)
            .await?
            .result
            .ok_or_else(|| Error::provider(PROVIDER_NAME, None, format!("{} response carried no result", operation)))
    }
}

#[async_trait]
impl DnsRecordService for CloudflareProvider {
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>> {
        let url = self.records_url(zone_id);
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let request = self
                .client
                .get(&url)
                .query(&[("page", page), ("per_page", PAGE_SIZE)]);
            let envelope = self.call::<Vec<DnsRecord>>(request, None, "list").await?;

            records.extend(envelope.result.unwrap_or_default());

            let total_pages = envelope
                .result_info
                .and_then(|info| info.total_pages)
                .unwrap_or(1);
            if page >= total_pages {
                break;
            }
            page += 1;
        }

        tracing::debug!("Listed {} record(s) in zone {}", records.len(), zone_id);
        Ok(records)
    }

    async fn create_record(&self, zone_id: &str, request: &RecordRequest) -> Result<DnsRecord> {
        tracing::info!(
            "Creating Cloudflare DNS record: {} -> {} ({})",
            request.name,
            request.content,
            request.record_type
        );

        let http_request = self.client.post(self.records_url(zone_id));
        self.call_for_record(http_request, request, "create").await
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        request: &RecordRequest,
    ) -> Result<DnsRecord> {
        tracing::info!(
            "Updating Cloudflare DNS record: {} -> {} ({})",
            request.name,
            request.content,
            request.record_type
        );

        let url = format!("{}/{}", self.records_url(zone_id), record_id);
        let http_request = self.client.put(url);
        self.call_for_record(http_request, request, "update").await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
