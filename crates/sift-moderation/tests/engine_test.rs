//! Integration tests for the moderation transition engine.
//!
//! Covers the terminal-state contract, ledger completeness under fault
//! injection, and the concurrent-decision race.

use std::sync::Arc;

use sift_core::{ContentId, CoreError, Outcome, Partition, SystemClock};
use sift_moderation::ModerationEngine;
use sift_testing::{invariants, ContentBuilder, TestEnv};

fn engine_for(env: &TestEnv) -> ModerationEngine {
    ModerationEngine::new(env.storage().clone(), Arc::new(SystemClock::new()))
}

#[tokio::test]
async fn approve_moves_record_and_records_obligation() {
    let env = TestEnv::new().await.expect("test env");
    let engine = engine_for(&env);

    let record = ContentBuilder::new().title("headline").build();
    env.storage().content.insert_pending(&record).await.expect("insert");

    let moved = engine.approve(record.id).await.expect("approve");
    assert_eq!(moved.id, record.id);
    assert_eq!(moved.created_at, record.created_at, "origin timestamp survives the move");

    invariants::assert_in_exactly(env.storage(), record.id, Partition::Approved)
        .await
        .expect("exclusive");

    let entries = env.storage().relay_ledger.for_content(record.id).await.expect("ledger");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].outcome, Outcome::Approved);
    assert!(entries[0].is_unsent(), "obligation starts unsent");
}

#[tokio::test]
async fn reject_is_symmetric() {
    let env = TestEnv::new().await.expect("test env");
    let engine = engine_for(&env);

    let record = ContentBuilder::new().build();
    env.storage().content.insert_pending(&record).await.expect("insert");

    engine.reject(record.id).await.expect("reject");

    invariants::assert_in_exactly(env.storage(), record.id, Partition::Rejected)
        .await
        .expect("exclusive");

    let entries = env.storage().relay_ledger.for_content(record.id).await.expect("ledger");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].outcome, Outcome::Rejected);
}

#[tokio::test]
async fn repeated_decisions_fail_already_resolved_without_new_obligation() {
    let env = TestEnv::new().await.expect("test env");
    let engine = engine_for(&env);

    let record = ContentBuilder::new().build();
    env.storage().content.insert_pending(&record).await.expect("insert");

    engine.approve(record.id).await.expect("first approve");

    let second = engine.approve(record.id).await.expect_err("second approve");
    assert!(matches!(second, CoreError::AlreadyResolved(id) if id == record.id));

    // Flipping the decision after the fact is refused the same way.
    let flip = engine.reject(record.id).await.expect_err("reject after approve");
    assert!(matches!(flip, CoreError::AlreadyResolved(_)));

    invariants::assert_in_exactly(env.storage(), record.id, Partition::Approved)
        .await
        .expect("state unchanged");
    let entries = env.storage().relay_ledger.for_content(record.id).await.expect("ledger");
    assert_eq!(entries.len(), 1, "retries must not mint new obligations");
}

#[tokio::test]
async fn unknown_id_fails_not_found() {
    let env = TestEnv::new().await.expect("test env");
    let engine = engine_for(&env);

    let missing = ContentId::new();
    let err = engine.approve(missing).await.expect_err("approve");
    assert!(matches!(err, CoreError::NotFound(id) if id == missing));
}

#[tokio::test]
async fn ledger_fault_rolls_back_the_partition_move() {
    let env = TestEnv::new().await.expect("test env");
    let engine = engine_for(&env);

    let record = ContentBuilder::new().build();
    env.storage().content.insert_pending(&record).await.expect("insert");

    // Fault between the move and the ledger write: the ledger table is gone,
    // so the insert inside the transaction must fail and undo the move.
    env.break_table("relay_ledger").await.expect("drop table");

    let err = engine.approve(record.id).await.expect_err("approve must fail");
    assert!(matches!(err, CoreError::StoreUnavailable(_)));

    invariants::assert_in_exactly(env.storage(), record.id, Partition::Pending)
        .await
        .expect("move rolled back");
}

#[tokio::test]
async fn racing_decisions_produce_exactly_one_winner() {
    let env = TestEnv::new().await.expect("test env");
    let engine = engine_for(&env);

    let record = ContentBuilder::new().build();
    env.storage().content.insert_pending(&record).await.expect("insert");

    let approve = tokio::spawn({
        let engine = engine.clone();
        let id = record.id;
        async move { engine.approve(id).await }
    });
    let reject = tokio::spawn({
        let engine = engine.clone();
        let id = record.id;
        async move { engine.reject(id).await }
    });

    let approve = approve.await.expect("join");
    let reject = reject.await.expect("join");

    let winners = [approve.is_ok(), reject.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(winners, 1, "exactly one decision wins the race");

    let loser = if approve.is_ok() { reject } else { approve };
    assert!(matches!(loser, Err(CoreError::AlreadyResolved(_))));

    let entries = env.storage().relay_ledger.for_content(record.id).await.expect("ledger");
    assert_eq!(entries.len(), 1, "one obligation for one winning transition");

    let holding = invariants::partitions_holding(env.storage(), record.id).await.expect("scan");
    assert_eq!(holding.len(), 1, "record lives in exactly one partition");
    assert_ne!(holding[0], Partition::Pending);
}
