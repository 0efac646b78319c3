//! DNS record model
//!
//! [`DnsRecord`] is what the provider reports; [`RecordRequest`] is the body
//! sent on create and update; [`ManagedRecord`] is the record the reconciler
//! holds on to after startup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::config::DdnsConfig;

/// A DNS record as reported by the provider
///
/// Provider metadata (timestamps, zone linkage, `meta`) is carried along but
/// never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Opaque identifier assigned by the provider
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(default)]
    pub proxied: bool,
    #[serde(default)]
    pub proxiable: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub meta: serde_json::Value,
}

impl DnsRecord {
    /// Parse the record content as an IP address, if it is one
    pub fn content_ip(&self) -> Option<IpAddr> {
        self.content.parse().ok()
    }
}

/// Body of a create or update request
///
/// Both calls send the same shape; only the target differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRequest {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub priority: u16,
    pub proxied: bool,
}

impl RecordRequest {
    /// Build the request for the configured record pointing at `ip`
    pub fn for_ip(config: &DdnsConfig, ip: IpAddr) -> Self {
        Self {
            record_type: config.record_type.clone(),
            name: config.record_name.clone(),
            content: ip.to_string(),
            ttl: config.ttl,
            priority: config.priority,
            proxied: config.proxied,
        }
    }
}

/// How the reconciler came to manage a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrigin {
    /// A record with the configured name already existed
    Adopted,
    /// The reconciler created the record at startup
    Created,
}

/// The record held by the reconciler for the lifetime of the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedRecord {
    /// Provider-assigned identifier, reused for every update
    pub id: String,
    pub origin: RecordOrigin,
    /// Last content known to be applied, when it is an IP address
    pub content: Option<IpAddr>,
}

/// Find the record matching `name`
///
/// Exact, case-sensitive comparison; the first match in provider order wins.
/// Which one is picked when the provider holds duplicates is undefined.
pub fn locate<'a>(records: &'a [DnsRecord], name: &str) -> Option<&'a DnsRecord> {
    records.iter().find(|record| record.name == name)
}
