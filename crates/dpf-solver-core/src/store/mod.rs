// # Record Store Implementations
//
// Provider-backed stores live in their own crates; this module only holds the
// in-memory store.

pub mod memory;

pub use memory::{MemoryRecordStore, MemoryRecordStoreFactory};
