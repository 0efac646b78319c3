//! Core traits for the DDNS client
//!
//! - [`IpResolver`]: Discover the current public IP
//! - [`DnsRecordService`]: List, create and update records via the provider API

pub mod ip_resolver;
pub mod dns_provider;

pub use ip_resolver::{IpResolver, IpVersion};
pub use dns_provider::DnsRecordService;
