//! Wire types for the DPF REST API
//!
//! Only the fields the solver reads or writes are modelled; everything else in
//! a response is ignored.

use dpf_solver_core::traits::{RecordData, RecordSet, RecordType};
use serde::{Deserialize, Serialize};

/// Page size for list calls
pub const PAGE_LIMIT: usize = 100;

/// One page of a list call
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Zone entry in `GET /zones`
#[derive(Debug, Deserialize)]
pub struct ZoneItem {
    pub id: String,
    pub name: String,
}

/// Record entry in `GET /zones/{id}/records`
#[derive(Debug, Deserialize)]
pub struct RecordItem {
    pub id: String,
    pub name: String,
    pub rrtype: String,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub rdata: Vec<RdataItem>,
    #[serde(default)]
    pub description: String,
}

impl RecordItem {
    /// Convert into the core model
    pub fn into_record_set(self, zone_id: &str, rrtype: RecordType) -> RecordSet {
        RecordSet {
            id: Some(self.id),
            zone_id: zone_id.to_string(),
            name: self.name,
            rrtype,
            ttl: self.ttl,
            rdata: self
                .rdata
                .into_iter()
                .map(|d| RecordData::new(d.value))
                .collect(),
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdataItem {
    pub value: String,
}

fn rdata_of(record: &RecordSet) -> Vec<RdataItem> {
    record
        .rdata
        .iter()
        .map(|d| RdataItem {
            value: d.value.clone(),
        })
        .collect()
}

/// Body of `POST /zones/{id}/records`
#[derive(Debug, Serialize)]
pub struct CreateRecordRequest<'a> {
    pub name: &'a str,
    pub ttl: u32,
    pub rrtype: &'static str,
    pub rdata: Vec<RdataItem>,
    pub description: &'a str,
}

impl<'a> From<&'a RecordSet> for CreateRecordRequest<'a> {
    fn from(record: &'a RecordSet) -> Self {
        Self {
            name: &record.name,
            ttl: record.ttl,
            rrtype: record.rrtype.as_str(),
            rdata: rdata_of(record),
            description: &record.description,
        }
    }
}

/// Body of `PATCH /zones/{id}/records/{id}`
#[derive(Debug, Serialize)]
pub struct UpdateRecordRequest<'a> {
    pub ttl: u32,
    pub rdata: Vec<RdataItem>,
    pub description: &'a str,
}

impl<'a> From<&'a RecordSet> for UpdateRecordRequest<'a> {
    fn from(record: &'a RecordSet) -> Self {
        Self {
            ttl: record.ttl,
            rdata: rdata_of(record),
            description: &record.description,
        }
    }
}

/// `202 Accepted` answer to a mutating call
#[derive(Debug, Deserialize)]
pub struct AsyncResponse {
    pub request_id: String,
    #[serde(default)]
    pub jobs_url: Option<String>,
}

/// Job states reported by `GET /jobs/{request_id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Running,
    Successful,
    Failed,
}

/// `GET /jobs/{request_id}`
#[derive(Debug, Deserialize)]
pub struct JobResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Error body returned with 4xx/5xx
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ErrorResponse {
    /// Human-readable summary, falling back to the raw body
    pub fn describe(&self, raw: &str) -> String {
        match (&self.error_type, &self.error_message) {
            (Some(t), Some(m)) => format!("{}: {}", t, m),
            (Some(t), None) => t.clone(),
            (None, Some(m)) => m.clone(),
            (None, None) => raw.trim().to_string(),
        }
    }
}
