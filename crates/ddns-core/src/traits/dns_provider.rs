// # DNS Record Service Trait
//
// Defines the interface to the authoritative DNS provider's record API.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsRecordService, RecordRequest};
//
// let service = /* DnsRecordService implementation */;
// let records = service.list_records("zone-id").await?;
// let created = service.create_record("zone-id", &request).await?;
// service.update_record("zone-id", &created.id, &request).await?;
// ```

use async_trait::async_trait;

use crate::record::{DnsRecord, RecordRequest};

/// Trait for DNS provider implementations
///
/// Providers are isolated and single-shot: each method performs the API
/// call(s) for one operation and reports the outcome.
///
/// ## Forbidden Capabilities
/// - ❌ Implement retry logic or backoff (owned by `Reconciler`)
/// - ❌ Cache records or ids between calls (owned by `Reconciler`)
/// - ❌ Decide whether an update is needed (owned by `Reconciler`)
///
/// # Errors
///
/// A non-success response must surface as
/// [`Error::Provider`](crate::Error::Provider) carrying the raw body; a
/// request that cannot be sent as [`Error::Network`](crate::Error::Network).
#[async_trait]
pub trait DnsRecordService: Send + Sync {
    /// List every record in the zone, in provider order
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a record in the zone
    ///
    /// # Returns
    ///
    /// The record as stored by the provider, including its new id
    async fn create_record(
        &self,
        zone_id: &str,
        request: &RecordRequest,
    ) -> Result<DnsRecord, crate::Error>;

    /// Replace the record with the given id in place
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        request: &RecordRequest,
    ) -> Result<DnsRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
