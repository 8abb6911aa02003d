// # Memory Secret Store
//
// In-memory implementation of SecretStore.
//
// ## When to Use
//
// - Testing environments
// - Embedding the solver in a process that already holds its credentials

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::secret_store::{SecretData, SecretStore};

/// In-memory secret store implementation
///
/// Secrets are keyed by (namespace, name). Clones share the same contents,
/// so a test can keep one handle and rotate secrets under a running solver.
///
/// # Example
///
/// ```rust,no_run
/// use dpf_solver_core::secrets::MemorySecretStore;
/// use dpf_solver_core::traits::SecretStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemorySecretStore::new();
///     store.insert("cert-manager", "dpf-credentials", "token", "s3cr3t").await;
///
///     let secret = store.get("cert-manager", "dpf-credentials").await?;
///     assert!(secret.is_some());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    inner: Arc<RwLock<HashMap<(String, String), SecretData>>>,
}

impl MemorySecretStore {
    /// Create a new empty memory secret store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one key of a secret, creating the secret if needed
    pub async fn insert(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
        value: impl AsRef<[u8]>,
    ) {
        let mut guard = self.inner.write().await;
        guard
            .entry((namespace.to_string(), name.to_string()))
            .or_default()
            .insert(key.to_string(), value.as_ref().to_vec());
    }

    /// Remove a whole secret
    pub async fn remove(&self, namespace: &str, name: &str) {
        let mut guard = self.inner.write().await;
        guard.remove(&(namespace.to_string(), name.to_string()));
    }

    /// Number of secrets in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<SecretData>, Error> {
        let guard = self.inner.read().await;
        Ok(guard
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemorySecretStore::new();
        assert!(store.is_empty().await);

        store.insert("ns", "creds", "token", "abc").await;
        store.insert("ns", "creds", "other", "def").await;
        assert_eq!(store.len().await, 1);

        let secret = store.get("ns", "creds").await.unwrap().unwrap();
        assert_eq!(secret.get("token"), Some(&b"abc".to_vec()));
        assert_eq!(secret.get("other"), Some(&b"def".to_vec()));

        store.remove("ns", "creds").await;
        assert!(store.get("ns", "creds").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_is_namespace_scoped() {
        let store = MemorySecretStore::new();
        store.insert("team-a", "creds", "token", "abc").await;

        assert!(store.get("team-a", "creds").await.unwrap().is_some());
        assert!(store.get("team-b", "creds").await.unwrap().is_none());
    }
}
