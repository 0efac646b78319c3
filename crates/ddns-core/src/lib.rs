// # ddns-core
//
// Core library for the dynamic DNS client.
//
// ## Architecture Overview
//
// This library keeps one DNS record synchronized with the host's public IP:
// - **IpResolver**: Trait for discovering the current public IP
// - **DnsRecordService**: Trait for listing, creating and updating records via a provider API
// - **Reconciler**: Decides create-vs-adopt at startup, then updates the record on an interval
// - **DdnsConfig**: The immutable configuration, passed explicitly into the reconciler
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Reconciliation logic is separate from HTTP implementations
// 2. **Fail Fast**: Provider failures stop the reconciler; only IP discovery is retried
// 3. **Library-First**: The daemon is a thin wrapper around this crate

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod record;

// Re-export core types for convenience
pub use traits::{DnsRecordService, IpResolver, IpVersion};
pub use engine::{ReconcileEvent, Reconciler, TickOutcome};
pub use config::DdnsConfig;
pub use error::{Error, Result};
pub use record::{DnsRecord, ManagedRecord, RecordOrigin, RecordRequest};
