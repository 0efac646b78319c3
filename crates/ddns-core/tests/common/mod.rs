//! Test doubles and common utilities for reconciler contract tests
//!
//! The doubles are cheap to clone: clones share counters and state, so a test
//! keeps one handle and hands another to the reconciler.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::record::{DnsRecord, RecordRequest};
use ddns_core::traits::{DnsRecordService, IpResolver};
use ddns_core::DdnsConfig;
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpResolver that plays back a script, then keeps answering `fallback`
#[derive(Clone)]
pub struct ScriptedIpResolver {
    script: Arc<Mutex<VecDeque<Result<IpAddr>>>>,
    fallback: Arc<Mutex<IpAddr>>,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedIpResolver {
    /// Always answer `ip`
    pub fn new(ip: IpAddr) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(ip)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail `failures` times with a network error, then answer `ip`
    pub fn failing_then(failures: usize, ip: IpAddr) -> Self {
        let resolver = Self::new(ip);
        for n in 0..failures {
            resolver.push(Err(Error::network(format!("connection refused #{}", n))));
        }
        resolver
    }

    /// Queue one scripted answer
    pub fn push(&self, answer: Result<IpAddr>) {
        self.script.lock().unwrap().push_back(answer);
    }

    /// Change the answer given once the script is exhausted
    pub fn set_ip(&self, ip: IpAddr) {
        *self.fallback.lock().unwrap() = ip;
    }

    /// Number of times resolve() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpResolver for ScriptedIpResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(answer) => answer,
            None => Ok(*self.fallback.lock().unwrap()),
        }
    }
}

/// Which provider operation should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    List,
    Create,
    Update,
}

/// An in-memory DnsRecordService that tracks calls
#[derive(Clone)]
pub struct MockRecordService {
    records: Arc<Mutex<Vec<DnsRecord>>>,
    list_call_count: Arc<AtomicUsize>,
    create_requests: Arc<Mutex<Vec<RecordRequest>>>,
    update_requests: Arc<Mutex<Vec<(String, RecordRequest)>>>,
    fail_on: Arc<Mutex<Option<FailOn>>>,
    unreachable_on: Arc<Mutex<Option<FailOn>>>,
}

impl MockRecordService {
    pub fn new(records: Vec<DnsRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            list_call_count: Arc::new(AtomicUsize::new(0)),
            create_requests: Arc::new(Mutex::new(Vec::new())),
            update_requests: Arc::new(Mutex::new(Vec::new())),
            fail_on: Arc::new(Mutex::new(None)),
            unreachable_on: Arc::new(Mutex::new(None)),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Make one operation answer with a provider error from now on
    pub fn fail_on(&self, op: FailOn) {
        *self.fail_on.lock().unwrap() = Some(op);
    }

    /// Make one operation fail at the transport level from now on
    pub fn unreachable_on(&self, op: FailOn) {
        *self.unreachable_on.lock().unwrap() = Some(op);
    }

    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    pub fn create_call_count(&self) -> usize {
        self.create_requests.lock().unwrap().len()
    }

    pub fn update_call_count(&self) -> usize {
        self.update_requests.lock().unwrap().len()
    }

    /// Bodies of every create call, in order
    pub fn create_requests(&self) -> Vec<RecordRequest> {
        self.create_requests.lock().unwrap().clone()
    }

    /// (record id, body) of every update call, in order
    pub fn update_requests(&self) -> Vec<(String, RecordRequest)> {
        self.update_requests.lock().unwrap().clone()
    }

    /// Records currently held by the fake provider
    pub fn records(&self) -> Vec<DnsRecord> {
        self.records.lock().unwrap().clone()
    }

    fn failure(&self, op: FailOn) -> Option<Error> {
        if *self.unreachable_on.lock().unwrap() == Some(op) {
            return Some(Error::network("connection reset by peer"));
        }
        (*self.fail_on.lock().unwrap() == Some(op)).then(|| {
            Error::provider(
                "mock",
                Some(400),
                r#"{"success":false,"errors":[{"code":1004,"message":"DNS Validation Error"}]}"#,
            )
        })
    }
}

#[async_trait::async_trait]
impl DnsRecordService for MockRecordService {
    async fn list_records(&self, _zone_id: &str) -> Result<Vec<DnsRecord>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure(FailOn::List) {
            return Err(err);
        }
        Ok(self.records())
    }

    async fn create_record(&self, _zone_id: &str, request: &RecordRequest) -> Result<DnsRecord> {
        self.create_requests.lock().unwrap().push(request.clone());
        if let Some(err) = self.failure(FailOn::Create) {
            return Err(err);
        }

        let mut records = self.records.lock().unwrap();
        let created = record_from_request(&format!("created-{}", records.len() + 1), request);
        records.push(created.clone());
        Ok(created)
    }

    async fn update_record(
        &self,
        _zone_id: &str,
        record_id: &str,
        request: &RecordRequest,
    ) -> Result<DnsRecord> {
        self.update_requests
            .lock()
            .unwrap()
            .push((record_id.to_string(), request.clone()));
        if let Some(err) = self.failure(FailOn::Update) {
            return Err(err);
        }

        let mut records = self.records.lock().unwrap();
        let stored = records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| Error::provider("mock", Some(404), "record not found"))?;
        *stored = record_from_request(record_id, request);
        Ok(stored.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A provider record with the given id, name and content
pub fn dns_record(id: &str, name: &str, content: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        record_type: "A".to_string(),
        name: name.to_string(),
        content: content.to_string(),
        ttl: 1,
        priority: None,
        proxied: false,
        proxiable: true,
        locked: false,
        zone_id: Some("zone-1".to_string()),
        zone_name: Some("example.com".to_string()),
        created_on: None,
        modified_on: None,
        meta: serde_json::Value::Null,
    }
}

fn record_from_request(id: &str, request: &RecordRequest) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        record_type: request.record_type.clone(),
        name: request.name.clone(),
        content: request.content.clone(),
        ttl: request.ttl,
        priority: Some(request.priority),
        proxied: request.proxied,
        ..dns_record(id, &request.name, &request.content)
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(record_name: &str) -> DdnsConfig {
    let mut config = DdnsConfig::new("test-token", "zone-1", record_name, "http://ip.test/");
    config.interval_secs = 300;
    config.resolve_retry_delay_secs = 0;
    config
}
