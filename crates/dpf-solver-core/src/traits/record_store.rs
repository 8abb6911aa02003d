// # Record Store Trait
//
// Defines the interface to the remote record-set API the solver reconciles
// against.
//
// ## Implementations
//
// - IIJ DNS Platform: `dpf-provider-iij` crate
// - In-memory: `MemoryRecordStore` (tests, embedding)
//
// ## Usage
//
// ```rust,ignore
// use dpf_solver_core::traits::{RecordStore, RecordType};
//
// let zone = store.get_zone_by_name("example.com.").await?;
// match store.get_record(&zone.id, "_acme-challenge.example.com.", RecordType::Txt).await? {
//     Some(record) => println!("values: {:?}", record.values()),
//     None => println!("no TXT record yet"),
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// TTL given to record sets the solver creates
pub const CHALLENGE_TTL: u32 = 300;

/// Description given to record sets the solver creates
pub const CHALLENGE_DESCRIPTION: &str = "created by dpf-solver";

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    Txt,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Txt => "TXT",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A zone managed by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Opaque provider-assigned id
    pub id: String,
    /// Canonical zone name
    pub name: String,
}

/// One value inside a record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordData {
    pub value: String,
}

impl RecordData {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// All values sharing one (zone, name, type) key
///
/// At most one record set exists per key; multiple values live in `rdata`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    /// Provider-assigned id, `None` until the set has been created
    pub id: Option<String>,
    /// Zone the set belongs to
    pub zone_id: String,
    /// Canonical owner name
    pub name: String,
    /// Record type
    pub rrtype: RecordType,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Ordered values
    pub rdata: Vec<RecordData>,
    /// Free-form description
    pub description: String,
}

impl RecordSet {
    /// Build a fresh TXT record set holding a single challenge value
    pub fn new_txt(zone_id: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: None,
            zone_id: zone_id.into(),
            name: name.into(),
            rrtype: RecordType::Txt,
            ttl: CHALLENGE_TTL,
            rdata: vec![RecordData::new(value)],
            description: CHALLENGE_DESCRIPTION.to_string(),
        }
    }

    /// Whether any entry holds exactly `value`
    pub fn contains_value(&self, value: &str) -> bool {
        self.rdata.iter().any(|d| d.value == value)
    }

    /// The values, in order
    pub fn values(&self) -> Vec<&str> {
        self.rdata.iter().map(|d| d.value.as_str()).collect()
    }
}

/// Final state of a remote task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Successful,
}

/// Outcome of a mutating call that completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReceipt {
    /// Remote task (request) identifier
    pub task_id: String,
    /// Final task status
    pub status: TaskStatus,
}

impl TaskReceipt {
    pub fn successful(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Successful,
        }
    }
}

/// Outcome of a mutating call that failed
///
/// The task id is kept whenever the provider issued one, even if the task
/// itself failed, so operators can look it up.
#[derive(Debug)]
pub struct TaskFailure {
    /// Remote task identifier, if one was obtained
    pub task_id: Option<String>,
    /// What went wrong
    pub error: crate::Error,
}

impl TaskFailure {
    /// Failure before any task was issued
    pub fn untracked(error: crate::Error) -> Self {
        Self {
            task_id: None,
            error,
        }
    }

    /// Failure of an issued task
    pub fn tracked(task_id: impl Into<String>, error: crate::Error) -> Self {
        Self {
            task_id: Some(task_id.into()),
            error,
        }
    }

    /// Turn the failure into a solver error for `operation`
    pub fn into_error(self, operation: crate::error::TaskOperation) -> crate::Error {
        crate::Error::task(operation, self.task_id, self.error)
    }
}

/// Result of a mutating store call
pub type TaskResult = std::result::Result<TaskReceipt, TaskFailure>;

/// Trait for remote record stores
///
/// Mutating calls are synchronous from the caller's point of view: they return
/// once the provider's underlying job has finished. Implementations must not
/// retry; a failed call is reported and the host decides what to do.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up a zone by canonical name
    ///
    /// # Returns
    ///
    /// - `Ok(Zone)`: The zone
    /// - `Err(Error::ZoneNotFound)`: No zone has this name
    /// - `Err(Error)`: The lookup failed
    async fn get_zone_by_name(&self, name: &str) -> Result<Zone, crate::Error>;

    /// Look up the record set for (zone, name, type)
    ///
    /// # Returns
    ///
    /// - `Ok(Some(RecordSet))`: The record set
    /// - `Ok(None)`: No record set exists for this key
    /// - `Err(Error)`: The lookup failed
    async fn get_record(
        &self,
        zone_id: &str,
        name: &str,
        rrtype: RecordType,
    ) -> Result<Option<RecordSet>, crate::Error>;

    /// Create a record set and wait for the task to finish
    async fn create_record(&self, record: &RecordSet) -> TaskResult;

    /// Replace the values/TTL/description of an existing record set
    async fn update_record(&self, record: &RecordSet) -> TaskResult;

    /// Delete an existing record set
    async fn delete_record(&self, record: &RecordSet) -> TaskResult;

    /// Provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing record stores from resolved settings
///
/// A factory is built once and reused; it may hold shared transport state
/// (e.g. an HTTP connection pool). Every call to [`RecordStoreFactory::create`]
/// yields a handle bound to the token it was given.
pub trait RecordStoreFactory: Send + Sync {
    /// Create a store handle
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL, `None` for the provider default
    /// - `token`: Bearer token
    fn create(
        &self,
        endpoint: Option<&str>,
        token: &str,
    ) -> Result<Box<dyn RecordStore>, crate::Error>;
}
