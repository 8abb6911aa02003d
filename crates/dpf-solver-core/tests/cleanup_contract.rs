//! Behavior Contract Test: CleanUp
//!
//! Constraints verified:
//! - Only the challenge key is removed; other values survive untouched
//! - Removing the last value deletes the record set
//! - A record set already left empty is deleted
//! - Cleaning up an absent record set or an absent key succeeds without mutations
//! - Store failures propagate, wrapped with the task id
//!
//! If this test fails, CleanUp may leave records behind or destroy unrelated ones.

mod common;

use common::*;
use dpf_solver_core::traits::{RecordData, RecordSet};
use dpf_solver_core::{Error, Solver, TaskOperation};

async fn seed(h: &Harness, values: &[&str]) {
    let mut record = RecordSet::new_txt(&h.zone.id, NAME, values.first().copied().unwrap_or(""));
    record.rdata = values.iter().map(|v| RecordData::new(*v)).collect();
    h.store.inner().seed_record(record).await;
}

#[tokio::test]
async fn removes_only_the_challenge_key() {
    let h = Harness::new().await;
    seed(&h, &["other-1", "token-a", "other-2"]).await;

    h.solver.clean_up(&challenge("token-a")).await.unwrap();

    assert_eq!(h.values().await, strings(&["other-1", "other-2"]));
    assert_eq!(h.store.counters().updates(), 1);
    assert_eq!(h.store.counters().deletes(), 0);
}

#[tokio::test]
async fn removes_every_copy_of_the_key() {
    let h = Harness::new().await;
    seed(&h, &["token-a", "other", "token-a"]).await;

    h.solver.clean_up(&challenge("token-a")).await.unwrap();

    assert_eq!(h.values().await, strings(&["other"]));
}

#[tokio::test]
async fn match_is_exact() {
    let h = Harness::new().await;
    seed(&h, &["Token-A", "token-a "]).await;

    h.solver.clean_up(&challenge("token-a")).await.unwrap();

    assert_eq!(h.values().await, strings(&["Token-A", "token-a "]));
    assert_eq!(h.store.counters().mutations(), 0);
}

#[tokio::test]
async fn last_value_tears_down_record_set() {
    let h = Harness::new().await;
    h.solver.present(&challenge("token-a")).await.unwrap();

    h.solver.clean_up(&challenge("token-a")).await.unwrap();

    assert_eq!(h.values().await, None, "empty record set must not be left behind");
    assert_eq!(h.store.counters().deletes(), 1);
}

#[tokio::test]
async fn empty_record_set_is_deleted() {
    let h = Harness::new().await;
    seed(&h, &[]).await;
    assert_eq!(h.values().await, Some(vec![]));

    h.solver.clean_up(&challenge("token-a")).await.unwrap();

    assert_eq!(h.values().await, None, "empty record set must not be left behind");
    assert_eq!(h.store.counters().deletes(), 1);
    assert_eq!(h.store.counters().updates(), 0);
}

#[tokio::test]
async fn absent_record_is_noop() {
    let h = Harness::new().await;

    h.solver.clean_up(&challenge("token-a")).await.unwrap();
    h.solver.clean_up(&challenge("token-a")).await.unwrap();

    assert_eq!(h.store.counters().record_lookups(), 2);
    assert_eq!(h.store.counters().mutations(), 0);
}

#[tokio::test]
async fn full_lifecycle_returns_to_absent() {
    let h = Harness::new().await;

    h.solver.present(&challenge("token-a")).await.unwrap();
    h.solver.present(&challenge("token-b")).await.unwrap();
    h.solver.clean_up(&challenge("token-a")).await.unwrap();
    assert_eq!(h.values().await, strings(&["token-b"]));

    h.solver.clean_up(&challenge("token-b")).await.unwrap();
    h.solver.clean_up(&challenge("token-b")).await.unwrap();
    assert_eq!(h.values().await, None);

    // create, update, update, delete
    assert_eq!(h.store.counters().mutations(), 4);
}

#[tokio::test]
async fn delete_failure_without_task_id_reports_unknown() {
    let h = Harness::new().await;
    seed(&h, &["token-a"]).await;
    h.store.fail_on(FailOn::Delete);

    let err = h.solver.clean_up(&challenge("token-a")).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Task { operation: TaskOperation::Delete, ref task_id, .. } if task_id == "unknown"
    ));
    assert_eq!(h.values().await, strings(&["token-a"]));
}

#[tokio::test]
async fn update_failure_propagates() {
    let h = Harness::new().await;
    seed(&h, &["token-a", "other"]).await;
    h.store.fail_on(FailOn::Update);

    let err = h.solver.clean_up(&challenge("token-a")).await.unwrap_err();

    assert!(err.to_string().contains("task_id: req-update-failed"));
}

#[tokio::test]
async fn lookup_failure_propagates() {
    let h = Harness::new().await;
    seed(&h, &["token-a"]).await;
    h.store.fail_on(FailOn::GetRecord);

    assert!(h.solver.clean_up(&challenge("token-a")).await.is_err());
    assert_eq!(h.store.counters().mutations(), 0);
}
