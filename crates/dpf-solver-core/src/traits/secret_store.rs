// # Secret Store Trait
//
// Defines the interface for looking up namespace-scoped secrets, such as the
// API token for the record store.
//
// ## Implementations
//
// - In-memory: `MemorySecretStore`
// - Mounted directories: `DirSecretStore`

use async_trait::async_trait;
use std::collections::HashMap;

/// Contents of one secret: key -> raw bytes
pub type SecretData = HashMap<String, Vec<u8>>;

/// Trait for secret store implementations
///
/// Lookups are never cached by callers; rotating a secret takes effect on the
/// next lookup.
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a secret
    ///
    /// # Parameters
    ///
    /// - `namespace`: Scope of the lookup
    /// - `name`: Secret name
    ///
    /// # Returns
    ///
    /// - `Ok(Some(SecretData))`: The secret's data
    /// - `Ok(None)`: No such secret
    /// - `Err(Error)`: Storage error
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<SecretData>, crate::Error>;
}
