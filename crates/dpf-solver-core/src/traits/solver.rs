// # Solver Trait
//
// The interface a host uses to drive DNS-01 challenges.

use async_trait::async_trait;

use crate::challenge::ChallengeRequest;

/// Trait for DNS-01 challenge solvers
///
/// # Idempotency
///
/// Both operations may be invoked several times with the same request.
/// Repeating `present` must keep the value presented; repeating `clean_up`
/// (or cleaning up a value that was never presented) must succeed.
///
/// # Concurrency
///
/// Hosts may run operations for different challenges concurrently, including
/// several challenges for the same name. Implementations keep no mutable state
/// between calls.
#[async_trait]
pub trait Solver: Send + Sync {
    /// Solver name, unique within a host deployment
    fn name(&self) -> &'static str;

    /// Ensure the TXT record set for the challenge contains its key
    async fn present(&self, challenge: &ChallengeRequest) -> Result<(), crate::Error>;

    /// Remove the challenge key, deleting the record set once it is empty
    async fn clean_up(&self, challenge: &ChallengeRequest) -> Result<(), crate::Error>;
}
