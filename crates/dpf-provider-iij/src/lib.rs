// # IIJ DNS Platform Record Store
//
// This crate provides a `RecordStore` implementation backed by the IIJ DNS
// Platform Service (DPF) REST API.
//
// ## Behavior
//
// - One HTTP request per lookup page, one request per mutation plus job polls
// - Mutations are asynchronous on the DPF side: the API answers `202` with a
//   request id, and this store polls `/jobs/{request_id}` until the job leaves
//   `RUNNING`. Callers see a synchronous call.
// - HTTP timeout configured per request (30 seconds); no overall deadline on
//   job polling
// - NO retry logic (the host orchestrator owns retries)
// - NO caching (every call goes to the API)
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
//
// ## API Reference
//
// - List zones: GET `/zones?_keywords_name[]=...`
// - List records: GET `/zones/:zone_id/records?_keywords_name[]=...&_keywords_rrtype[]=TXT`
// - Create record: POST `/zones/:zone_id/records`
// - Update record: PATCH `/zones/:zone_id/records/:record_id`
// - Delete record: DELETE `/zones/:zone_id/records/:record_id`
// - Job status: GET `/jobs/:request_id`

pub mod api;

use async_trait::async_trait;
use dpf_solver_core::canonical_name;
use dpf_solver_core::traits::{
    RecordSet, RecordStore, RecordStoreFactory, RecordType, TaskFailure, TaskReceipt, TaskResult,
    Zone,
};
use dpf_solver_core::{Error, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use api::{
    AsyncResponse, CreateRecordRequest, ErrorResponse, JobResponse, JobStatus, ListResponse,
    PAGE_LIMIT, RecordItem, UpdateRecordRequest, ZoneItem,
};

/// DPF API base URL
pub const DEFAULT_ENDPOINT: &str = "https://api.dns-platform.jp/dpf/v1";

/// Default interval between job status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER_NAME: &str = "iij-dpf";

/// Record store talking to the DPF REST API
///
/// A store is bound to one endpoint and one token. It is cheap to build: the
/// HTTP client (and its connection pool) is shared with the factory.
pub struct DpfRecordStore {
    /// API token
    /// ⚠️ NEVER log this value
    token: String,

    /// API base URL, without trailing slash
    endpoint: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Delay between job status polls
    poll_interval: Duration,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for DpfRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DpfRecordStore")
            .field("token", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl DpfRecordStore {
    /// Create a new DPF record store
    ///
    /// # Parameters
    ///
    /// - `client`: Shared HTTP client
    /// - `endpoint`: API base URL, `None` for [`DEFAULT_ENDPOINT`]
    /// - `token`: API access token
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)`: If the endpoint is not an http(s) URL or the token is empty
    pub fn new(
        client: reqwest::Client,
        endpoint: Option<&str>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::config("DPF API token is required"));
        }

        let endpoint = endpoint.unwrap_or(DEFAULT_ENDPOINT).trim().trim_end_matches('/');
        let url = reqwest::Url::parse(endpoint)
            .map_err(|e| Error::config(format!("Invalid DPF endpoint '{}': {}", endpoint, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::config(format!(
                "Invalid DPF endpoint '{}': scheme must be http or https",
                endpoint
            )));
        }

        Ok(Self {
            token,
            endpoint: endpoint.to_string(),
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Set the delay between job status polls
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// The API base URL in use
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Walk a paged list call and return the first item matching `predicate`
    async fn find_first<T, F>(
        &self,
        path: &str,
        filters: &[(&str, &str)],
        predicate: F,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let mut offset = 0usize;
        loop {
            let request = self
                .client
                .get(self.url(path))
                .bearer_auth(&self.token)
                .query(filters)
                .query(&[("offset", offset), ("limit", PAGE_LIMIT)]);

            let response = request
                .send()
                .await
                .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

            let status = response.status();
            if !status.is_success() {
                let raw = response.text().await.unwrap_or_default();
                let parsed: ErrorResponse = serde_json::from_str(&raw).unwrap_or_default();
                return Err(status_error(status, &parsed, &raw, path));
            }

            let page: ListResponse<T> = response.json().await.map_err(|e| {
                Error::provider(PROVIDER_NAME, format!("Failed to parse response: {}", e))
            })?;

            let count = page.results.len();
            if let Some(found) = page.results.into_iter().find(|item| predicate(item)) {
                return Ok(Some(found));
            }
            if count < PAGE_LIMIT {
                return Ok(None);
            }
            offset += PAGE_LIMIT;
        }
    }

    /// Send a mutating request and wait for its job to finish
    async fn submit(&self, request: RequestBuilder, context: &str) -> TaskResult {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| TaskFailure::untracked(Error::http(format!("HTTP request failed: {}", e))))?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let parsed: ErrorResponse = serde_json::from_str(&raw).unwrap_or_default();
            let error = status_error(status, &parsed, &raw, context);
            return Err(match parsed.request_id {
                Some(request_id) => TaskFailure::tracked(request_id, error),
                None => TaskFailure::untracked(error),
            });
        }

        let accepted: AsyncResponse = response.json().await.map_err(|e| {
            TaskFailure::untracked(Error::provider(
                PROVIDER_NAME,
                format!("Failed to parse response: {}", e),
            ))
        })?;

        tracing::debug!(
            request_id = %accepted.request_id,
            jobs_url = accepted.jobs_url.as_deref().unwrap_or(""),
            "{} accepted, waiting for job",
            context
        );

        self.wait_for_job(&accepted.request_id).await
    }

    /// Poll a job until it is no longer running
    async fn wait_for_job(&self, request_id: &str) -> TaskResult {
        let path = format!("/jobs/{}", request_id);
        loop {
            let response = self
                .client
                .get(self.url(&path))
                .bearer_auth(&self.token)
                .send()
                .await
                .map_err(|e| {
                    TaskFailure::tracked(request_id, Error::http(format!("HTTP request failed: {}", e)))
                })?;

            let status = response.status();
            if !status.is_success() {
                let raw = response.text().await.unwrap_or_default();
                let parsed: ErrorResponse = serde_json::from_str(&raw).unwrap_or_default();
                return Err(TaskFailure::tracked(
                    request_id,
                    status_error(status, &parsed, &raw, "job status"),
                ));
            }

            let job: JobResponse = response.json().await.map_err(|e| {
                TaskFailure::tracked(
                    request_id,
                    Error::provider(PROVIDER_NAME, format!("Failed to parse job status: {}", e)),
                )
            })?;

            match job.status {
                JobStatus::Running => {
                    tracing::trace!(request_id = request_id, "Job still running");
                    tokio::time::sleep(self.poll_interval).await;
                }
                JobStatus::Successful => {
                    return Ok(TaskReceipt::successful(
                        job.request_id.unwrap_or_else(|| request_id.to_string()),
                    ));
                }
                JobStatus::Failed => {
                    let detail = ErrorResponse {
                        request_id: None,
                        error_type: job.error_type,
                        error_message: job.error_message,
                    }
                    .describe("job failed");
                    return Err(TaskFailure::tracked(
                        request_id,
                        Error::provider(PROVIDER_NAME, format!("job FAILED: {}", detail)),
                    ));
                }
            }
        }
    }

    fn record_path(record: &RecordSet) -> std::result::Result<String, TaskFailure> {
        let id = record.id.as_deref().ok_or_else(|| {
            TaskFailure::untracked(Error::invalid_input(format!(
                "record set {} has no id",
                record.name
            )))
        })?;
        Ok(format!("/zones/{}/records/{}", record.zone_id, id))
    }
}

/// Map a non-success HTTP status to an error
fn status_error(status: StatusCode, body: &ErrorResponse, raw: &str, context: &str) -> Error {
    let detail = body.describe(raw);
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "{}: invalid API token or insufficient permissions (status {}): {}",
            context, status, detail
        )),
        404 => Error::provider(
            PROVIDER_NAME,
            format!("{}: not found (status {}): {}", context, status, detail),
        ),
        429 => Error::provider(
            PROVIDER_NAME,
            format!("{}: rate limit exceeded (status {})", context, status),
        ),
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!("{}: DPF server error (transient) (status {}): {}", context, status, detail),
        ),
        _ => Error::provider(
            PROVIDER_NAME,
            format!("{}: request failed (status {}): {}", context, status, detail),
        ),
    }
}

#[async_trait]
impl RecordStore for DpfRecordStore {
    async fn get_zone_by_name(&self, name: &str) -> Result<Zone> {
        let wanted = canonical_name(name);
        tracing::debug!(zone = %wanted, "Looking up zone");

        let zone: Option<ZoneItem> = self
            .find_first("/zones", &[("_keywords_name[]", wanted.as_str())], |z: &ZoneItem| {
                canonical_name(&z.name) == wanted
            })
            .await?;

        let zone = zone.ok_or_else(|| Error::zone_not_found(&wanted))?;
        tracing::debug!(zone = %wanted, zone_id = %zone.id, "Found zone");

        Ok(Zone {
            id: zone.id,
            name: wanted,
        })
    }

    async fn get_record(
        &self,
        zone_id: &str,
        name: &str,
        rrtype: RecordType,
    ) -> Result<Option<RecordSet>> {
        let wanted = canonical_name(name);
        tracing::debug!(zone_id = zone_id, name = %wanted, rrtype = %rrtype, "Looking up record set");

        let path = format!("/zones/{}/records", zone_id);
        let filters = [
            ("_keywords_name[]", wanted.as_str()),
            ("_keywords_rrtype[]", rrtype.as_str()),
        ];
        let record: Option<RecordItem> = self
            .find_first(&path, &filters, |r: &RecordItem| {
                r.rrtype.eq_ignore_ascii_case(rrtype.as_str()) && canonical_name(&r.name) == wanted
            })
            .await?;

        Ok(record.map(|r| r.into_record_set(zone_id, rrtype)))
    }

    async fn create_record(&self, record: &RecordSet) -> TaskResult {
        let body = CreateRecordRequest::from(record);
        let request = self
            .client
            .post(self.url(&format!("/zones/{}/records", record.zone_id)))
            .json(&body);

        let receipt = self.submit(request, "create record").await?;
        tracing::info!(name = %record.name, task_id = %receipt.task_id, "DPF record created");
        Ok(receipt)
    }

    async fn update_record(&self, record: &RecordSet) -> TaskResult {
        let path = Self::record_path(record)?;
        let body = UpdateRecordRequest::from(record);
        let request = self.client.patch(self.url(&path)).json(&body);

        let receipt = self.submit(request, "update record").await?;
        tracing::info!(name = %record.name, task_id = %receipt.task_id, "DPF record updated");
        Ok(receipt)
    }

    async fn delete_record(&self, record: &RecordSet) -> TaskResult {
        let path = Self::record_path(record)?;
        let request = self.client.delete(self.url(&path));

        let receipt = self.submit(request, "delete record").await?;
        tracing::info!(name = %record.name, task_id = %receipt.task_id, "DPF record deleted");
        Ok(receipt)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating DPF record stores
///
/// Holds the HTTP client shared by every store it creates.
#[derive(Debug, Clone)]
pub struct DpfStoreFactory {
    client: reqwest::Client,
    poll_interval: Duration,
}

impl DpfStoreFactory {
    /// Create a factory with a fresh HTTP client
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client))
    }

    /// Create a factory around an existing HTTP client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the job poll interval for stores created from now on
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl RecordStoreFactory for DpfStoreFactory {
    fn create(&self, endpoint: Option<&str>, token: &str) -> Result<Box<dyn RecordStore>> {
        let store = DpfRecordStore::new(self.client.clone(), endpoint, token)?
            .with_poll_interval(self.poll_interval);
        Ok(Box::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(endpoint: Option<&str>) -> Result<DpfRecordStore> {
        DpfRecordStore::new(reqwest::Client::new(), endpoint, "secret_token_12345")
    }

    #[test]
    fn test_default_endpoint() {
        let store = store(None).unwrap();
        assert_eq!(store.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let store = store(Some("https://dpf.example.test/v1/")).unwrap();
        assert_eq!(store.endpoint(), "https://dpf.example.test/v1");
        assert_eq!(store.url("/zones"), "https://dpf.example.test/v1/zones");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        assert!(matches!(store(Some("not a url")), Err(Error::Config(_))));
        assert!(matches!(store(Some("ftp://dpf.example.test")), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_token_rejected() {
        let result = DpfRecordStore::new(reqwest::Client::new(), None, "");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let store = store(None).unwrap();

        let debug_str = format!("{:?}", store);
        assert!(!debug_str.contains("secret_token_12345"));
        assert!(debug_str.contains("DpfRecordStore"));
    }

    #[test]
    fn test_status_error_mapping() {
        let body = ErrorResponse::default();

        let err = status_error(StatusCode::UNAUTHORIZED, &body, "", "list zones");
        assert!(matches!(err, Error::Authentication(_)));

        let err = status_error(StatusCode::TOO_MANY_REQUESTS, &body, "", "list zones");
        assert!(err.to_string().contains("rate limit"));

        let err = status_error(StatusCode::BAD_GATEWAY, &body, "", "list zones");
        assert!(err.to_string().contains("transient"));
    }

    #[test]
    fn test_record_path_requires_id() {
        let mut record = RecordSet::new_txt("z1", "_acme-challenge.example.com.", "abc");
        assert!(DpfRecordStore::record_path(&record).is_err());

        record.id = Some("r1".to_string());
        assert_eq!(
            DpfRecordStore::record_path(&record).unwrap(),
            "/zones/z1/records/r1"
        );
    }

    #[test]
    fn test_factory_creates_store() {
        let factory = DpfStoreFactory::new().unwrap();

        let store = factory.create(Some("https://dpf.example.test/v1"), "token").unwrap();
        assert_eq!(store.provider_name(), "iij-dpf");

        assert!(factory.create(None, "").is_err());
    }
}
