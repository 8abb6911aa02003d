// # Store Resolver
//
// Turns a challenge's opaque config blob and namespace into an authenticated
// record store handle.
//
// ## Flow
//
// ```text
// config blob ──► ProviderConfig ──► tokenSecretRef
//                                        │
//                namespace ─────────────►│ SecretStore::get
//                                        ▼
//                                  secret data ──► token ──► RecordStoreFactory::create
// ```
//
// Credentials are resolved on every call. Nothing is cached, so a rotated
// token takes effect on the next challenge.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::traits::{RecordStore, RecordStoreFactory, SecretStore};
use crate::{Error, Result};

/// Resolves store handles from challenge configuration
#[derive(Clone)]
pub struct StoreResolver {
    secrets: Arc<dyn SecretStore>,
    factory: Arc<dyn RecordStoreFactory>,
}

impl StoreResolver {
    /// Create a new resolver
    ///
    /// # Parameters
    ///
    /// - `secrets`: Where API tokens are looked up
    /// - `factory`: Builds store handles from an endpoint and token
    pub fn new(secrets: Arc<dyn SecretStore>, factory: Arc<dyn RecordStoreFactory>) -> Self {
        Self { secrets, factory }
    }

    /// Resolve a store handle
    ///
    /// Leading and trailing whitespace is trimmed from the token before it
    /// reaches the factory.
    ///
    /// # Parameters
    ///
    /// - `config`: Raw provider configuration, `None` when the challenge has none
    /// - `namespace`: Namespace the token secret is looked up in
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn RecordStore>)`: A handle bound to the resolved token
    /// - `Err(Error::ConfigDecode)`: The blob is malformed
    /// - `Err(Error::SecretNotFound)`: The secret is missing or unreadable
    /// - `Err(Error::KeyNotFound)`: The secret has no such key
    pub async fn resolve(
        &self,
        config: Option<&Value>,
        namespace: &str,
    ) -> Result<Box<dyn RecordStore>> {
        let config = ProviderConfig::load(config)?;
        let selector = &config.token_secret_ref;

        tracing::debug!(
            namespace = namespace,
            secret = %selector.name,
            key = %selector.key,
            "Resolving API token"
        );

        let secret = match self.secrets.get(namespace, &selector.name).await {
            Ok(Some(secret)) => secret,
            Ok(None) => {
                return Err(Error::secret_not_found(
                    &selector.name,
                    format!("secret \"{}\" not found in namespace \"{}\"", selector.name, namespace),
                ));
            }
            Err(e) => return Err(Error::secret_not_found(&selector.name, e.to_string())),
        };

        let raw = secret
            .get(&selector.key)
            .ok_or_else(|| Error::key_not_found(&selector.key))?;

        let token = std::str::from_utf8(raw)
            .map_err(|_| {
                Error::invalid_input(format!(
                    "key \"{}\" of secret \"{}\" is not valid UTF-8",
                    selector.key, selector.name
                ))
            })?
            .trim();

        if token.is_empty() {
            tracing::warn!(
                secret = %selector.name,
                key = %selector.key,
                "API token is empty"
            );
        }

        self.factory.create(config.endpoint(), token)
    }
}

impl fmt::Debug for StoreResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreResolver").finish_non_exhaustive()
    }
}
