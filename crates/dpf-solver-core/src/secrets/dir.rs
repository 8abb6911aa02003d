// # Directory Secret Store
//
// Reads secrets from a mounted-secret directory tree.
//
// ## Layout
//
// ```text
// <root>/
//   <namespace>/
//     <secret-name>/
//       <key>        # file contents are the value
// ```
//
// This matches how orchestrators project secrets into a pod: one directory per
// secret, one file per key. Hidden entries (such as the `..data` symlink farm
// that projected volumes use) are skipped; symlinked key files are followed.
//
// ## Rotation
//
// Nothing is cached. Every lookup re-reads the directory, so a rotated token
// is picked up by the next challenge.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::Error;
use crate::traits::secret_store::{SecretData, SecretStore};

/// Secret store backed by a directory tree
#[derive(Debug, Clone)]
pub struct DirSecretStore {
    root: PathBuf,
}

impl DirSecretStore {
    /// Create a store rooted at `root`
    ///
    /// The root is not required to exist yet; lookups against a missing root
    /// report "not found".
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory holding one secret's keys
    fn secret_dir(&self, namespace: &str, name: &str) -> Result<PathBuf, Error> {
        validate_component("namespace", namespace)?;
        validate_component("secret name", name)?;
        Ok(self.root.join(namespace).join(name))
    }
}

/// Reject anything that could escape the store root
fn validate_component(what: &str, value: &str) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::invalid_input(format!("{} cannot be empty", what)));
    }
    if value == "." || value == ".." || value.contains('/') || value.contains('\\') {
        return Err(Error::invalid_input(format!(
            "{} is not a valid path component: '{}'",
            what, value
        )));
    }
    Ok(())
}

#[async_trait]
impl SecretStore for DirSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<SecretData>, Error> {
        let dir = self.secret_dir(namespace, name)?;

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Secret directory does not exist: {}", dir.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::secret_store(format!(
                    "Failed to read secret directory {}: {}",
                    dir.display(),
                    e
                )));
            }
        };

        let mut data = SecretData::new();
        loop {
            let entry = entries.next_entry().await.map_err(|e| {
                Error::secret_store(format!(
                    "Failed to list secret directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            let Some(entry) = entry else { break };

            let file_name = entry.file_name();
            let Some(key) = file_name.to_str() else {
                tracing::warn!("Skipping non UTF-8 key in {}", dir.display());
                continue;
            };
            if key.starts_with('.') {
                continue;
            }

            let path = entry.path();
            // metadata() follows symlinks
            let metadata = fs::metadata(&path).await.map_err(|e| {
                Error::secret_store(format!("Failed to stat {}: {}", path.display(), e))
            })?;
            if !metadata.is_file() {
                continue;
            }

            let value = fs::read(&path).await.map_err(|e| {
                Error::secret_store(format!("Failed to read {}: {}", path.display(), e))
            })?;
            data.insert(key.to_string(), value);
        }

        tracing::trace!("Loaded secret {}/{} ({} keys)", namespace, name, data.len());
        Ok(Some(data))
    }
}
