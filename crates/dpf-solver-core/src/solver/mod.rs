//! DNS-01 challenge reconciler
//!
//! [`DpfSolver`] turns a challenge into the smallest sequence of record-store
//! calls that brings the challenge's TXT record set to the desired state.
//!
//! ## State Machine
//!
//! For one (zone, name, TXT) record set:
//!
//! ```text
//!                  present(v): create
//!        ┌────────┐ ─────────────────────► ┌──────────────┐
//!        │ Absent │                        │ Present{S}   │ ◄─┐ present(v): S ∪ {v}
//!        └────────┘ ◄───────────────────── └──────────────┘ ──┘ clean_up(v): S ∖ {v}
//!         ▲      │   clean_up(v), S = {v}:
//!         └──────┘   delete
//!      clean_up(v): no-op
//! ```
//!
//! A missing record set is an expected branch (create on present, no-op on
//! clean-up). A missing zone is always an error.

use async_trait::async_trait;

use crate::challenge::ChallengeRequest;
use crate::error::TaskOperation;
use crate::resolver::StoreResolver;
use crate::traits::{RecordData, RecordSet, RecordStore, RecordType, Solver};
use crate::Result;

/// Name the solver registers under
pub const SOLVER_NAME: &str = "iij-dpf";

/// DNS-01 solver for the IIJ DNS Platform
///
/// Holds only the immutable resolver; every call resolves its own store
/// handle, so concurrent calls share nothing mutable.
#[derive(Debug, Clone)]
pub struct DpfSolver {
    resolver: StoreResolver,
}

impl DpfSolver {
    /// Create a new solver
    pub fn new(resolver: StoreResolver) -> Self {
        Self { resolver }
    }

    async fn store_for(&self, challenge: &ChallengeRequest) -> Result<Box<dyn RecordStore>> {
        self.resolver
            .resolve(challenge.config.as_ref(), &challenge.resource_namespace)
            .await
    }
}

#[async_trait]
impl Solver for DpfSolver {
    fn name(&self) -> &'static str {
        SOLVER_NAME
    }

    async fn present(&self, challenge: &ChallengeRequest) -> Result<()> {
        let store = self.store_for(challenge).await?;
        present_in(store.as_ref(), challenge).await
    }

    async fn clean_up(&self, challenge: &ChallengeRequest) -> Result<()> {
        let store = self.store_for(challenge).await?;
        clean_up_in(store.as_ref(), challenge).await
    }
}

/// Ensure the challenge key is part of the TXT record set
pub async fn present_in(store: &dyn RecordStore, challenge: &ChallengeRequest) -> Result<()> {
    let zone_name = challenge.zone_name();
    let target = challenge.target_name();

    let zone = store.get_zone_by_name(&zone_name).await?;
    tracing::debug!(zone = %zone.name, zone_id = %zone.id, "Found zone");

    match store.get_record(&zone.id, &target, RecordType::Txt).await? {
        None => {
            let record = RecordSet::new_txt(&zone.id, &target, &challenge.key);
            let receipt = store
                .create_record(&record)
                .await
                .map_err(|f| f.into_error(TaskOperation::Create))?;

            tracing::info!(
                provider = store.provider_name(),
                name = %target,
                task_id = %receipt.task_id,
                "Created TXT record"
            );
        }
        Some(record) if record.contains_value(&challenge.key) => {
            tracing::debug!(name = %target, "TXT record already holds the key, nothing to do");
        }
        Some(mut record) => {
            record.rdata.push(RecordData::new(&challenge.key));
            let receipt = store
                .update_record(&record)
                .await
                .map_err(|f| f.into_error(TaskOperation::Update))?;

            tracing::info!(
                provider = store.provider_name(),
                name = %target,
                values = record.rdata.len(),
                task_id = %receipt.task_id,
                "Appended key to TXT record"
            );
        }
    }

    Ok(())
}

/// Remove the challenge key, deleting the record set when nothing is left
pub async fn clean_up_in(store: &dyn RecordStore, challenge: &ChallengeRequest) -> Result<()> {
    let zone_name = challenge.zone_name();
    let target = challenge.target_name();

    let zone = store.get_zone_by_name(&zone_name).await?;
    tracing::debug!(zone = %zone.name, zone_id = %zone.id, "Found zone");

    let Some(mut record) = store.get_record(&zone.id, &target, RecordType::Txt).await? else {
        tracing::debug!(name = %target, "No TXT record, nothing to clean up");
        return Ok(());
    };

    // An empty set is still torn down even though it cannot hold the key
    if !record.contains_value(&challenge.key) && !record.rdata.is_empty() {
        tracing::debug!(name = %target, "TXT record does not hold the key, nothing to clean up");
        return Ok(());
    }

    record.rdata.retain(|d| d.value != challenge.key);

    if record.rdata.is_empty() {
        let receipt = store
            .delete_record(&record)
            .await
            .map_err(|f| f.into_error(TaskOperation::Delete))?;

        tracing::info!(
            provider = store.provider_name(),
            name = %target,
            task_id = %receipt.task_id,
            "Deleted TXT record"
        );
    } else {
        let receipt = store
            .update_record(&record)
            .await
            .map_err(|f| f.into_error(TaskOperation::Update))?;

        tracing::info!(
            provider = store.provider_name(),
            name = %target,
            values = record.rdata.len(),
            task_id = %receipt.task_id,
            "Removed key from TXT record"
        );
    }

    Ok(())
}
