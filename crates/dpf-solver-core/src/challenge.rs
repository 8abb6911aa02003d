//! Challenge requests and DNS name canonicalization

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One DNS-01 challenge, as handed to [`crate::Solver::present`] and
/// [`crate::Solver::clean_up`]
///
/// The JSON form uses camelCase field names. Fields the solver does not need
/// (`uid`, `action`, `resolvedFQDN`, ...) are ignored on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    /// Zone the provider is authoritative for (e.g. `example.com.`)
    pub resolved_zone: String,

    /// Name the TXT record must exist under (e.g. `_acme-challenge.example.com.`)
    pub dns_name: String,

    /// TXT value to add or remove
    pub key: String,

    /// Namespace used to scope the credential lookup
    #[serde(default)]
    pub resource_namespace: String,

    /// Opaque provider configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl ChallengeRequest {
    /// Create a challenge request without provider configuration
    pub fn new(
        resolved_zone: impl Into<String>,
        dns_name: impl Into<String>,
        key: impl Into<String>,
        resource_namespace: impl Into<String>,
    ) -> Self {
        Self {
            resolved_zone: resolved_zone.into(),
            dns_name: dns_name.into(),
            key: key.into(),
            resource_namespace: resource_namespace.into(),
            config: None,
        }
    }

    /// Attach a provider configuration blob
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    /// Canonical form of the resolved zone
    pub fn zone_name(&self) -> String {
        canonical_name(&self.resolved_zone)
    }

    /// Canonical form of the record name
    pub fn target_name(&self) -> String {
        canonical_name(&self.dns_name)
    }
}

/// Canonicalize a DNS name: lower-case, exactly one trailing dot
///
/// `"_ACME-challenge.Example.com"` and `"_acme-challenge.example.com."` both
/// become `"_acme-challenge.example.com."`. The root (or an empty name) is `"."`.
pub fn canonical_name(name: &str) -> String {
    let trimmed = name.trim().trim_end_matches('.');
    let mut canonical = trimmed.to_ascii_lowercase();
    canonical.push('.');
    canonical
}
