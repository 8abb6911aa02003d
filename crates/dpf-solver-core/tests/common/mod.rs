//! Test doubles and common utilities for solver contract tests
//!
//! The doubles wrap the in-memory store so tests can count remote calls and
//! inject failures without a real provider.

#![allow(dead_code)]

use async_trait::async_trait;
use dpf_solver_core::traits::{
    RecordSet, RecordStore, RecordStoreFactory, RecordType, TaskFailure, TaskResult, Zone,
};
use dpf_solver_core::{
    ChallengeRequest, DpfSolver, Error, MemoryRecordStore, MemorySecretStore, StoreResolver,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const NAMESPACE: &str = "cert-manager";
pub const SECRET_NAME: &str = "dpf-credentials";
pub const SECRET_KEY: &str = "token";
pub const TOKEN: &str = "s3cr3t-token";
pub const ZONE: &str = "example.com.";
pub const NAME: &str = "_acme-challenge.example.com.";

/// Which store call should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    GetRecord,
    Create,
    Update,
    Delete,
}

/// Call counters shared between a store and its clones
#[derive(Debug, Default)]
pub struct Counters {
    pub zone_lookups: AtomicUsize,
    pub record_lookups: AtomicUsize,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl Counters {
    /// Number of create/update/delete calls
    pub fn mutations(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
            + self.updates.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
    }

    pub fn record_lookups(&self) -> usize {
        self.record_lookups.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

/// A RecordStore that counts calls and can be told to fail
#[derive(Clone)]
pub struct CountingRecordStore {
    inner: MemoryRecordStore,
    counters: Arc<Counters>,
    fail_on: Arc<Mutex<Option<FailOn>>>,
}

impl CountingRecordStore {
    pub fn new(inner: MemoryRecordStore) -> Self {
        Self {
            inner,
            counters: Arc::new(Counters::default()),
            fail_on: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a new store that shares state and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            inner: other.inner.clone(),
            counters: Arc::clone(&other.counters),
            fail_on: Arc::clone(&other.fail_on),
        }
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn inner(&self) -> &MemoryRecordStore {
        &self.inner
    }

    /// Make every subsequent call of this kind fail
    pub fn fail_on(&self, call: FailOn) {
        *self.fail_on.lock().unwrap() = Some(call);
    }

    fn should_fail(&self, call: FailOn) -> bool {
        *self.fail_on.lock().unwrap() == Some(call)
    }
}

#[async_trait]
impl RecordStore for CountingRecordStore {
    async fn get_zone_by_name(&self, name: &str) -> Result<Zone, Error> {
        self.counters.zone_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_zone_by_name(name).await
    }

    async fn get_record(
        &self,
        zone_id: &str,
        name: &str,
        rrtype: RecordType,
    ) -> Result<Option<RecordSet>, Error> {
        self.counters.record_lookups.fetch_add(1, Ordering::SeqCst);
        if self.should_fail(FailOn::GetRecord) {
            return Err(Error::http("connection reset by peer"));
        }
        self.inner.get_record(zone_id, name, rrtype).await
    }

    async fn create_record(&self, record: &RecordSet) -> TaskResult {
        self.counters.creates.fetch_add(1, Ordering::SeqCst);
        if self.should_fail(FailOn::Create) {
            return Err(TaskFailure::tracked(
                "req-create-failed",
                Error::provider("test", "job FAILED"),
            ));
        }
        self.inner.create_record(record).await
    }

    async fn update_record(&self, record: &RecordSet) -> TaskResult {
        self.counters.updates.fetch_add(1, Ordering::SeqCst);
        if self.should_fail(FailOn::Update) {
            return Err(TaskFailure::tracked(
                "req-update-failed",
                Error::provider("test", "job FAILED"),
            ));
        }
        self.inner.update_record(record).await
    }

    async fn delete_record(&self, record: &RecordSet) -> TaskResult {
        self.counters.deletes.fetch_add(1, Ordering::SeqCst);
        if self.should_fail(FailOn::Delete) {
            return Err(TaskFailure::untracked(Error::http("connection refused")));
        }
        self.inner.delete_record(record).await
    }

    fn provider_name(&self) -> &'static str {
        "test"
    }
}

/// A factory that records what it was asked to build
#[derive(Clone)]
pub struct RecordingFactory {
    store: CountingRecordStore,
    requests: Arc<Mutex<Vec<(Option<String>, String)>>>,
}

impl RecordingFactory {
    pub fn new(store: CountingRecordStore) -> Self {
        Self {
            store,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// (endpoint, token) pairs passed to `create`, in call order
    pub fn requests(&self) -> Vec<(Option<String>, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl RecordStoreFactory for RecordingFactory {
    fn create(&self, endpoint: Option<&str>, token: &str) -> Result<Box<dyn RecordStore>, Error> {
        self.requests
            .lock()
            .unwrap()
            .push((endpoint.map(str::to_string), token.to_string()));
        Ok(Box::new(CountingRecordStore::sharing_counters_with(&self.store)))
    }
}

/// Everything a contract test needs, wired together
pub struct Harness {
    pub solver: DpfSolver,
    pub store: CountingRecordStore,
    pub secrets: MemorySecretStore,
    pub factory: RecordingFactory,
    pub zone: Zone,
}

impl Harness {
    /// Solver with one zone (`example.com.`) and a valid token secret
    pub async fn new() -> Self {
        let memory = MemoryRecordStore::new();
        let zone = memory.add_zone(ZONE).await;
        let store = CountingRecordStore::new(memory);

        let secrets = MemorySecretStore::new();
        secrets.insert(NAMESPACE, SECRET_NAME, SECRET_KEY, TOKEN).await;

        let factory = RecordingFactory::new(store.clone());
        let resolver = StoreResolver::new(Arc::new(secrets.clone()), Arc::new(factory.clone()));

        Self {
            solver: DpfSolver::new(resolver),
            store,
            secrets,
            factory,
            zone,
        }
    }

    /// Current values of the challenge TXT record set, `None` if absent
    pub async fn values(&self) -> Option<Vec<String>> {
        self.store
            .inner()
            .record(&self.zone.id, NAME, RecordType::Txt)
            .await
            .map(|r| r.rdata.into_iter().map(|d| d.value).collect())
    }

    /// Current challenge TXT record set
    pub async fn record(&self) -> Option<RecordSet> {
        self.store
            .inner()
            .record(&self.zone.id, NAME, RecordType::Txt)
            .await
    }
}

/// Provider configuration pointing at the test secret
pub fn provider_config() -> serde_json::Value {
    json!({
        "endpoint": "https://dpf.test/v1",
        "tokenSecretRef": { "name": SECRET_NAME, "key": SECRET_KEY }
    })
}

/// A challenge for the default zone and name
pub fn challenge(key: &str) -> ChallengeRequest {
    ChallengeRequest::new(ZONE, NAME, key, NAMESPACE).with_config(provider_config())
}

/// Owned strings for value assertions
pub fn strings(values: &[&str]) -> Option<Vec<String>> {
    Some(values.iter().map(|v| v.to_string()).collect())
}
