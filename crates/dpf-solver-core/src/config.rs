//! Configuration types for the solver
//!
//! The provider configuration arrives as an opaque JSON blob attached to each
//! challenge request. It is decoded here into [`ProviderConfig`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider configuration decoded from a challenge request's `config` blob
///
/// ```json
/// {
///   "endpoint": "https://api.dns-platform.jp/dpf/v1",
///   "tokenSecretRef": { "name": "dpf-credentials", "key": "token" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// Base URL of the provider API. Empty means the provider default.
    pub endpoint: String,

    /// Where to find the API token
    pub token_secret_ref: SecretKeySelector,
}

impl ProviderConfig {
    /// Decode a raw configuration blob
    ///
    /// An absent blob (or a JSON `null`) yields the zero-value configuration.
    /// This is the base case for deployments that rely entirely on defaults.
    ///
    /// # Returns
    ///
    /// - `Ok(ProviderConfig)`: The decoded configuration
    /// - `Err(Error::ConfigDecode)`: If the blob does not match the schema
    pub fn load(raw: Option<&Value>) -> Result<Self, crate::Error> {
        match raw {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => Ok(Self::deserialize(value)?),
        }
    }

    /// The endpoint to use, if one was configured
    pub fn endpoint(&self) -> Option<&str> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            None
        } else {
            Some(endpoint)
        }
    }
}

/// Reference to one key inside a namespace-scoped secret
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretKeySelector {
    /// Secret name
    pub name: String,
    /// Key within the secret's data
    pub key: String,
}

impl SecretKeySelector {
    /// Create a new selector
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}
