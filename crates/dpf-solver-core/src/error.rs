//! Error types for the DNS-01 solver
//!
//! This module defines all error types used throughout the crate.
//!
//! A missing record set is not represented here: record lookups
//! return `Ok(None)` for it, so "not found" can never be confused with a
//! failed call.

use std::fmt;

use thiserror::Error;

/// Result type alias for solver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which mutating store call a [`Error::Task`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOperation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for TaskOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            TaskOperation::Create => "create",
            TaskOperation::Update => "update",
            TaskOperation::Delete => "delete",
        };
        f.write_str(verb)
    }
}

/// Core error type for the solver
#[derive(Error, Debug)]
pub enum Error {
    /// The provider configuration blob could not be decoded
    #[error("error decoding solver config: {0}")]
    ConfigDecode(#[from] serde_json::Error),

    /// The referenced secret does not exist (or could not be read)
    #[error("failed to get secret {name}: {message}")]
    SecretNotFound {
        /// Secret name
        name: String,
        /// Lookup detail
        message: String,
    },

    /// The secret exists but has no entry under the referenced key
    #[error("failed to get key: {key}")]
    KeyNotFound {
        /// Missing key
        key: String,
    },

    /// The provider has no zone with the requested name
    #[error("Zone not found: {zone}")]
    ZoneNotFound {
        /// Canonical zone name that was looked up
        zone: String,
    },

    /// A create/update/delete call failed
    #[error("failed to {operation} record task_id: {task_id} error: {source}")]
    Task {
        /// The mutating operation
        operation: TaskOperation,
        /// Remote task identifier, `unknown` when none was issued
        task_id: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Secret store-related errors
    #[error("Secret store error: {0}")]
    SecretStore(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a "secret not found" error
    pub fn secret_not_found(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SecretNotFound {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a "key not found" error
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    /// Create a "zone not found" error
    pub fn zone_not_found(zone: impl Into<String>) -> Self {
        Self::ZoneNotFound { zone: zone.into() }
    }

    /// Wrap a store failure with the operation and its task id
    pub fn task(operation: TaskOperation, task_id: Option<String>, source: Error) -> Self {
        Self::Task {
            operation,
            task_id: task_id.unwrap_or_else(|| "unknown".to_string()),
            source: Box::new(source),
        }
    }

    /// Create a secret store error
    pub fn secret_store(msg: impl Into<String>) -> Self {
        Self::SecretStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
