// # Memory Record Store
//
// In-memory implementation of RecordStore.
//
// ## When to Use
//
// - Testing environments
// - Dry runs against a seeded zone layout
//
// ## Semantics
//
// Mirrors the provider's record-set model: at most one set per
// (zone, name, type), ids assigned on create, and every mutation answered with
// a fresh task id (`task-1`, `task-2`, ...). Names are compared exactly; callers
// are expected to pass canonical names.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::record_store::{
    RecordSet, RecordStore, RecordStoreFactory, RecordType, TaskFailure, TaskReceipt, TaskResult,
    Zone,
};

const PROVIDER_NAME: &str = "memory";

type RecordKey = (String, String, RecordType);

#[derive(Debug, Default)]
struct Inner {
    /// Zones keyed by canonical name
    zones: HashMap<String, Zone>,
    /// Record sets keyed by (zone id, name, type)
    records: HashMap<RecordKey, RecordSet>,
}

/// In-memory record store implementation
///
/// Clones share state, so a test can hand one clone to the solver and inspect
/// the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<RwLock<Inner>>,
    next_id: Arc<AtomicU64>,
    next_task: Arc<AtomicU64>,
}

impl MemoryRecordStore {
    /// Create a new empty memory record store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone and return it
    ///
    /// Registering the same name twice returns the existing zone.
    pub async fn add_zone(&self, name: &str) -> Zone {
        let mut guard = self.inner.write().await;
        if let Some(zone) = guard.zones.get(name) {
            return zone.clone();
        }
        let zone = Zone {
            id: format!("zone-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            name: name.to_string(),
        };
        guard.zones.insert(name.to_string(), zone.clone());
        zone
    }

    /// Insert a record set directly, bypassing task accounting
    ///
    /// Assigns an id if the set has none. Replaces any set with the same key.
    pub async fn seed_record(&self, mut record: RecordSet) -> RecordSet {
        if record.id.is_none() {
            record.id = Some(self.allocate_record_id());
        }
        let mut guard = self.inner.write().await;
        guard.records.insert(key_of(&record), record.clone());
        record
    }

    /// Current record set for a key, if any
    pub async fn record(&self, zone_id: &str, name: &str, rrtype: RecordType) -> Option<RecordSet> {
        let guard = self.inner.read().await;
        guard
            .records
            .get(&(zone_id.to_string(), name.to_string(), rrtype))
            .cloned()
    }

    /// All record sets currently stored
    pub async fn records(&self) -> Vec<RecordSet> {
        let guard = self.inner.read().await;
        guard.records.values().cloned().collect()
    }

    /// Number of tasks issued so far
    pub fn tasks_issued(&self) -> u64 {
        self.next_task.load(Ordering::SeqCst)
    }

    fn allocate_record_id(&self) -> String {
        format!("record-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn issue_task(&self) -> String {
        format!("task-{}", self.next_task.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

fn key_of(record: &RecordSet) -> RecordKey {
    (record.zone_id.clone(), record.name.clone(), record.rrtype)
}

fn require_id(record: &RecordSet) -> Result<&str, TaskFailure> {
    record
        .id
        .as_deref()
        .ok_or_else(|| TaskFailure::untracked(Error::invalid_input("record set has no id")))
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get_zone_by_name(&self, name: &str) -> Result<Zone, Error> {
        let guard = self.inner.read().await;
        guard
            .zones
            .get(name)
            .cloned()
            .ok_or_else(|| Error::zone_not_found(name))
    }

    async fn get_record(
        &self,
        zone_id: &str,
        name: &str,
        rrtype: RecordType,
    ) -> Result<Option<RecordSet>, Error> {
        Ok(self.record(zone_id, name, rrtype).await)
    }

    async fn create_record(&self, record: &RecordSet) -> TaskResult {
        let mut guard = self.inner.write().await;
        let key = key_of(record);
        if guard.records.contains_key(&key) {
            let task_id = self.issue_task();
            return Err(TaskFailure::tracked(
                task_id,
                Error::provider(
                    PROVIDER_NAME,
                    format!("record set already exists: {} {}", record.name, record.rrtype),
                ),
            ));
        }

        let mut created = record.clone();
        created.id = Some(self.allocate_record_id());
        guard.records.insert(key, created);

        Ok(TaskReceipt::successful(self.issue_task()))
    }

    async fn update_record(&self, record: &RecordSet) -> TaskResult {
        let id = require_id(record)?;
        let mut guard = self.inner.write().await;

        let existing = guard
            .records
            .values_mut()
            .find(|r| r.id.as_deref() == Some(id));
        let Some(existing) = existing else {
            return Err(TaskFailure::tracked(
                self.issue_task(),
                Error::provider(PROVIDER_NAME, format!("record set not found: {}", id)),
            ));
        };

        existing.ttl = record.ttl;
        existing.rdata = record.rdata.clone();
        existing.description = record.description.clone();

        Ok(TaskReceipt::successful(self.issue_task()))
    }

    async fn delete_record(&self, record: &RecordSet) -> TaskResult {
        let id = require_id(record)?;
        let mut guard = self.inner.write().await;

        let key = guard
            .records
            .iter()
            .find(|(_, r)| r.id.as_deref() == Some(id))
            .map(|(k, _)| k.clone());
        let Some(key) = key else {
            return Err(TaskFailure::tracked(
                self.issue_task(),
                Error::provider(PROVIDER_NAME, format!("record set not found: {}", id)),
            ));
        };

        guard.records.remove(&key);
        Ok(TaskReceipt::successful(self.issue_task()))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory handing out clones of one shared [`MemoryRecordStore`]
///
/// The endpoint and token are ignored.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStoreFactory {
    store: MemoryRecordStore,
}

impl MemoryRecordStoreFactory {
    pub fn new(store: MemoryRecordStore) -> Self {
        Self { store }
    }

    /// The shared store
    pub fn store(&self) -> &MemoryRecordStore {
        &self.store
    }
}

impl RecordStoreFactory for MemoryRecordStoreFactory {
    fn create(
        &self,
        _endpoint: Option<&str>,
        _token: &str,
    ) -> Result<Box<dyn RecordStore>, Error> {
        Ok(Box::new(self.store.clone()))
    }
}
