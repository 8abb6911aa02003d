// # dpf-solver-core
//
// Core library for the IIJ DNS Platform DNS-01 challenge solver.
//
// ## Architecture Overview
//
// This library reconciles one TXT record set per challenge against a remote
// record-set API:
// - **RecordStore**: Trait for looking up and mutating zones' record sets
// - **RecordStoreFactory**: Builds authenticated store handles from an endpoint and token
// - **SecretStore**: Trait for fetching namespace-scoped secrets
// - **StoreResolver**: Config blob + namespace → authenticated store handle
// - **DpfSolver**: Present / CleanUp reconciliation
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Reconciliation is separate from the provider API client
// 2. **Not Found Is Not An Error**: Record lookups return `Option`, never a sentinel error
// 3. **Stateless Calls**: Every call resolves its own credentials and store handle
// 4. **Library-First**: The binary is a thin shim over this crate

pub mod challenge;
pub mod config;
pub mod error;
pub mod resolver;
pub mod secrets;
pub mod solver;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use challenge::{ChallengeRequest, canonical_name};
pub use config::{ProviderConfig, SecretKeySelector};
pub use error::{Error, Result, TaskOperation};
pub use resolver::StoreResolver;
pub use secrets::{DirSecretStore, MemorySecretStore};
pub use solver::{DpfSolver, SOLVER_NAME};
pub use store::{MemoryRecordStore, MemoryRecordStoreFactory};
pub use traits::{RecordStore, RecordStoreFactory, SecretStore, Solver};
