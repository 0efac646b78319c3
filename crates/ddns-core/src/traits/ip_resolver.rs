// # IP Resolver Trait
//
// Defines the interface for discovering the host's current public IP.
//
// ## Implementations
//
// - HTTP "what is my IP" endpoint: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpResolver;
//
// let resolver = /* IpResolver implementation */;
// let ip = resolver.resolve().await?;
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// IP version (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// The address family a DNS record type holds, if it is an address record
    pub fn for_record_type(record_type: &str) -> Option<Self> {
        match record_type.to_ascii_uppercase().as_str() {
            "A" => Some(Self::V4),
            "AAAA" => Some(Self::V6),
            _ => None,
        }
    }

    /// Whether `ip` belongs to this family
    pub fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            Self::V4 => ip.is_ipv4(),
            Self::V6 => ip.is_ipv6(),
        }
    }
}

/// Trait for IP resolver implementations
///
/// One call performs one lookup. Implementations must not retry or cache;
/// the reconciler owns the retry policy and re-resolves on every tick.
///
/// # Errors
///
/// - [`Error::Network`](crate::Error::Network) when the request cannot be sent
///   or the endpoint is unreachable
/// - [`Error::InvalidIp`](crate::Error::InvalidIp) when the answer is not a
///   valid IPv4/IPv6 literal
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Resolve the current public IP address
    async fn resolve(&self) -> Result<IpAddr, crate::Error>;
}
