//! Core traits for the solver
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`RecordStore`]: Look up and mutate record sets at the DNS provider
//! - [`SecretStore`]: Fetch namespace-scoped secrets
//! - [`Solver`]: Present and clean up DNS-01 challenges

pub mod record_store;
pub mod secret_store;
pub mod solver;

pub use record_store::{
    CHALLENGE_DESCRIPTION, CHALLENGE_TTL, RecordData, RecordSet, RecordStore, RecordStoreFactory,
    RecordType, TaskFailure, TaskReceipt, TaskResult, TaskStatus, Zone,
};
pub use secret_store::{SecretData, SecretStore};
pub use solver::Solver;
