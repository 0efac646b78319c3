//! Reconciliation loop
//!
//! The [`Reconciler`] keeps one DNS record pointed at the host's public IP:
//! - Resolving the current IP via [`IpResolver`] (retried until it succeeds)
//! - Locating the configured record among the zone's records
//! - Creating the record, or adopting the existing one
//! - Updating the record on a fixed interval
//!
//! ## Flow
//!
//! ```text
//! startup:  resolve ──▶ list ──▶ match? ──yes──▶ adopt id ───┐
//!                                  │                          │
//!                                  └──no──▶ create(ip) ──────┤
//!                                                             ▼
//! loop:     ┌──▶ resolve ──▶ update(id, ip) ──▶ sleep(interval) ──┐
//!           └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Policy
//!
//! - IP resolution: retried indefinitely with a fixed delay, never surfaced
//! - List/create/update: fatal, returned to the caller

use crate::config::DdnsConfig;
use crate::error::{Error, Result};
use crate::record::{self, ManagedRecord, RecordOrigin, RecordRequest};
use crate::traits::{DnsRecordService, IpResolver};
use std::convert::Infallible;
use std::net::IpAddr;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events emitted by the Reconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// Startup began for the configured record
    Started { record_name: String },

    /// One IP resolution attempt failed and will be retried
    ResolveFailed { attempt: usize, error: String },

    /// An existing record with the configured name was found
    RecordAdopted { record_id: String },

    /// No matching record existed, one was created
    RecordCreated { record_id: String, ip: IpAddr },

    /// The record was written with a freshly resolved IP
    RecordUpdated { record_id: String, ip: IpAddr },

    /// The write was skipped because the IP was already applied
    UpdateSkipped { record_id: String, ip: IpAddr },
}

/// Outcome of a single loop tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// An update request was issued with this IP
    Updated(IpAddr),
    /// The IP matched the last applied content and no request was issued
    Unchanged(IpAddr),
}

/// Dynamic DNS reconciler
///
/// Owns the configuration and the two collaborators for the process
/// lifetime. All work happens sequentially on the caller's task: at most one
/// resolve-and-update cycle is in flight.
pub struct Reconciler {
    /// Public IP discovery
    resolver: Box<dyn IpResolver>,

    /// Provider record API
    service: Box<dyn DnsRecordService>,

    /// Immutable configuration
    config: DdnsConfig,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<ReconcileEvent>,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Returns
    ///
    /// A tuple of (reconciler, event_receiver) where event_receiver yields
    /// reconcile events
    pub fn new(
        resolver: Box<dyn IpResolver>,
        service: Box<dyn DnsRecordService>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<ReconcileEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let reconciler = Self {
            resolver,
            service,
            config,
            event_tx: tx,
        };

        Ok((reconciler, rx))
    }

    /// The configuration this reconciler was built with
    pub fn config(&self) -> &DdnsConfig {
        &self.config
    }

    /// Run the reconciler
    ///
    /// Performs the startup decision, then updates the record every
    /// `interval` seconds. The interval is measured from the end of one
    /// tick's work to the start of the next.
    ///
    /// # Returns
    ///
    /// Only returns on a fatal provider error.
    pub async fn run(&self) -> Result<Infallible> {
        let mut managed = self.startup().await?;

        loop {
            self.tick(&mut managed).await?;
            tokio::time::sleep(self.config.interval()).await;
        }
    }

    /// Decide whether to adopt an existing record or create a new one
    ///
    /// Resolves the IP once and lists the zone once. A matching record is
    /// adopted without writing to it; otherwise one record is created with
    /// the resolved IP.
    pub async fn startup(&self) -> Result<ManagedRecord> {
        self.emit_event(ReconcileEvent::Started {
            record_name: self.config.record_name.clone(),
        });

        let ip = self.resolve_ip().await?;
        info!("Current public IP: {}", ip);

        let records = self
            .service
            .list_records(&self.config.zone_id)
            .await
            .inspect_err(|e| error!("Failed to list records in zone {}: {}", self.config.zone_id, e))?;
        debug!("Zone {} holds {} record(s)", self.config.zone_id, records.len());

        if let Some(existing) = record::locate(&records, &self.config.record_name) {
            info!(
                "Managing existing record {} (id: {}, content: {})",
                existing.name, existing.id, existing.content
            );
            self.emit_event(ReconcileEvent::RecordAdopted {
                record_id: existing.id.clone(),
            });

            return Ok(ManagedRecord {
                id: existing.id.clone(),
                origin: RecordOrigin::Adopted,
                content: existing.content_ip(),
            });
        }

        info!("No record named {}, creating it -> {}", self.config.record_name, ip);
        let request = RecordRequest::for_ip(&self.config, ip);
        let created = self
            .service
            .create_record(&self.config.zone_id, &request)
            .await
            .inspect_err(|e| error!("Failed to create record {}: {}", self.config.record_name, e))?;

        if created.id.is_empty() {
            return Err(Error::provider(
                self.service.provider_name(),
                None,
                "create response carried no record id",
            ));
        }

        info!("Created record {} (id: {})", created.name, created.id);
        self.emit_event(ReconcileEvent::RecordCreated {
            record_id: created.id.clone(),
            ip,
        });

        Ok(ManagedRecord {
            id: created.id,
            origin: RecordOrigin::Created,
            content: Some(ip),
        })
    }

    /// Perform one loop iteration: resolve, then update
    ///
    /// The update is unconditional unless `skip_unchanged` is set, in which
    /// case it is skipped when the IP equals the last applied content.
    pub async fn tick(&self, managed: &mut ManagedRecord) -> Result<TickOutcome> {
        let ip = self.resolve_ip().await?;

        if self.config.skip_unchanged && managed.content == Some(ip) {
            debug!("Record {} already points at {}, skipping update", managed.id, ip);
            self.emit_event(ReconcileEvent::UpdateSkipped {
                record_id: managed.id.clone(),
                ip,
            });
            return Ok(TickOutcome::Unchanged(ip));
        }

        info!("Updating record {} (id: {}) -> {}", self.config.record_name, managed.id, ip);
        let request = RecordRequest::for_ip(&self.config, ip);
        let updated = self
            .service
            .update_record(&self.config.zone_id, &managed.id, &request)
            .await
            .inspect_err(|e| error!("Failed to update record {}: {}", managed.id, e))?;
        debug!(
            "Provider acknowledged {} -> {} (modified_on: {:?})",
            updated.name, updated.content, updated.modified_on
        );

        managed.content = Some(ip);
        self.emit_event(ReconcileEvent::RecordUpdated {
            record_id: managed.id.clone(),
            ip,
        });

        Ok(TickOutcome::Updated(ip))
    }

    /// Resolve the current public IP, retrying until it succeeds
    ///
    /// Network failures and invalid answers are retried without limit after a
    /// fixed `resolve_retry_delay`; any other error is returned.
    pub async fn resolve_ip(&self) -> Result<IpAddr> {
        let delay = self.config.resolve_retry_delay();
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.resolver.resolve().await {
                Ok(ip) => {
                    if attempt > 1 {
                        info!("Resolved public IP after {} attempts", attempt);
                    }
                    return Ok(ip);
                }
                Err(e) if e.is_retryable_resolution() => {
                    warn!("Failed to resolve public IP (attempt {}): {}", attempt, e);
                    self.emit_event(ReconcileEvent::ResolveFailed {
                        attempt,
                        error: e.to_string(),
                    });

                    if delay.is_zero() {
                        tokio::task::yield_now().await;
                    } else {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Emit a reconcile event
    fn emit_event(&self, event: ReconcileEvent) {
        // Dropped (with a warning) when the receiver lags behind or is gone
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full or closed, dropping event");
        }
    }
}
