// # Secret Store Implementations
//
// This module provides implementations of the SecretStore trait for
// different credential sources.

pub mod dir;
pub mod memory;

pub use dir::DirSecretStore;
pub use memory::MemorySecretStore;
