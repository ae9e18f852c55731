//! Integration tests for the webhook outbox.
//!
//! Tests in this file share the `webhook_jobs` table, so they run one at a
//! time and start from a table with no pending jobs.

#![allow(clippy::unwrap_used)]

mod common;

use chrono::{DateTime, Duration, Utc};
use paylane_core::webhook::{
    DeliveryError, FailureReason, JobStatus, JobTransition, RetryPolicy, after_delivery,
};
use paylane_db::entities::webhook_jobs;
use paylane_db::{LedgerRepository, OutboxRepository};
use paylane_shared::types::{Currency, WebhookJobId};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde_json::json;
use tokio::sync::{Mutex, MutexGuard};

use common::{balance_of, open_account, setup};

static TABLE: Mutex<()> = Mutex::const_new(());

async fn exclusive(db: &DatabaseConnection) -> MutexGuard<'static, ()> {
    let guard = TABLE.lock().await;
    db.execute_unprepared("UPDATE webhook_jobs SET status = 'FAILED' WHERE status = 'PENDING'")
        .await
        .unwrap();
    guard
}

/// Claims at `clock`, applies `outcome`, and commits, as the worker does.
///
/// Afterwards `clock` is moved past the longest possible backoff, so the next
/// call sees any rescheduled job as due.
async fn attempt(
    db: &DatabaseConnection,
    policy: &RetryPolicy,
    clock: &mut DateTime<Utc>,
    outcome: Result<(), DeliveryError>,
) -> Option<(WebhookJobId, JobTransition)> {
    let now = *clock;
    *clock = now + Duration::from_std(policy.max_delay).unwrap() + Duration::seconds(1);

    let txn = db.begin().await.unwrap();
    let job = OutboxRepository::claim_next(&txn, now).await.unwrap()?;
    let id = WebhookJobId::from_uuid(job.id);
    let transition = after_delivery(policy, job.attempts, &outcome, now);
    OutboxRepository::apply_transition(&txn, id, &transition)
        .await
        .unwrap();
    txn.commit().await.unwrap();
    Some((id, transition))
}

fn status(job: &webhook_jobs::Model) -> JobStatus {
    job.status.into()
}

#[tokio::test]
async fn test_enqueue_commits_and_rolls_back_with_business_change() {
    let Some(db) = setup().await else { return };
    let _table = exclusive(&db).await;
    let outbox = OutboxRepository::new(db.clone());
    let account = open_account(&db, Currency::Tzs, 0).await.unwrap();

    let txn = db.begin().await.unwrap();
    LedgerRepository::deposit_within(&txn, account.id, 1000, "rolled back")
        .await
        .unwrap();
    let dropped = OutboxRepository::enqueue(&txn, "http://merchant.test/hook", &json!({"n": 1}))
        .await
        .unwrap();
    txn.rollback().await.unwrap();

    assert!(outbox.find(dropped).await.unwrap().is_none());
    assert_eq!(balance_of(&db, &account).await, 0);

    let txn = db.begin().await.unwrap();
    LedgerRepository::deposit_within(&txn, account.id, 1000, "committed")
        .await
        .unwrap();
    let kept = OutboxRepository::enqueue(&txn, "http://merchant.test/hook", &json!({"n": 2}))
        .await
        .unwrap();
    txn.commit().await.unwrap();

    let job = outbox.find(kept).await.unwrap().unwrap();
    assert_eq!(status(&job), JobStatus::Pending);
    assert_eq!(job.attempts, 0);
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&job.payload).unwrap(),
        json!({"n": 2})
    );
    assert_eq!(balance_of(&db, &account).await, 1000);
}

#[tokio::test]
async fn test_claim_skips_locked_rows() {
    let Some(db) = setup().await else { return };
    let _table = exclusive(&db).await;

    let first = OutboxRepository::enqueue(&db, "http://merchant.test/a", &json!({}))
        .await
        .unwrap();
    let second = OutboxRepository::enqueue(&db, "http://merchant.test/b", &json!({}))
        .await
        .unwrap();

    let now = Utc::now() + Duration::seconds(1);
    let worker_a = db.begin().await.unwrap();
    let worker_b = db.begin().await.unwrap();
    let worker_c = db.begin().await.unwrap();

    let claimed_a = OutboxRepository::claim_next(&worker_a, now).await.unwrap().unwrap();
    let claimed_b = OutboxRepository::claim_next(&worker_b, now).await.unwrap().unwrap();
    let claimed_c = OutboxRepository::claim_next(&worker_c, now).await.unwrap();

    // Oldest first, and never the same row twice.
    assert_eq!(claimed_a.id, first.into_inner());
    assert_eq!(claimed_b.id, second.into_inner());
    assert!(claimed_c.is_none());

    worker_a.rollback().await.unwrap();
    worker_b.rollback().await.unwrap();
    worker_c.rollback().await.unwrap();
}

#[tokio::test]
async fn test_future_jobs_are_not_claimed() {
    let Some(db) = setup().await else { return };
    let _table = exclusive(&db).await;

    let id = OutboxRepository::enqueue(&db, "http://merchant.test/later", &json!({}))
        .await
        .unwrap();
    let later = Utc::now() + Duration::minutes(10);
    OutboxRepository::apply_transition(
        &db,
        id,
        &JobTransition::Reschedule {
            attempts: 1,
            next_run_at: later,
        },
    )
    .await
    .unwrap();

    let txn = db.begin().await.unwrap();
    assert!(
        OutboxRepository::claim_next(&txn, Utc::now())
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        OutboxRepository::claim_next(&txn, later)
            .await
            .unwrap()
            .is_some()
    );
    txn.rollback().await.unwrap();
}

#[tokio::test]
async fn test_five_failures_mark_job_failed() {
    let Some(db) = setup().await else { return };
    let _table = exclusive(&db).await;
    let outbox = OutboxRepository::new(db.clone());
    let policy = RetryPolicy::default();

    let id = OutboxRepository::enqueue(&db, "http://merchant.test/down", &json!({}))
        .await
        .unwrap();
    let mut clock = Utc::now() + Duration::minutes(1);

    for expected_attempts in 1..=4 {
        let claimed_at = clock;
        let (claimed, transition) =
            attempt(&db, &policy, &mut clock, Err(DeliveryError::Status(500)))
                .await
                .unwrap();
        assert_eq!(claimed, id);
        assert!(matches!(
            transition,
            JobTransition::Reschedule { attempts, .. } if attempts == expected_attempts
        ));
        let job = outbox.find(id).await.unwrap().unwrap();
        assert_eq!(status(&job), JobStatus::Pending);
        assert!(job.next_run_at > claimed_at);
        assert!(job.next_run_at < clock);
    }

    let (_, transition) = attempt(&db, &policy, &mut clock, Err(DeliveryError::Timeout))
        .await
        .unwrap();
    assert_eq!(
        transition,
        JobTransition::Fail {
            attempts: 5,
            reason: FailureReason::AttemptsExhausted
        }
    );

    let job = outbox.find(id).await.unwrap().unwrap();
    assert_eq!(status(&job), JobStatus::Failed);
    assert_eq!(job.attempts, 5);
    let mut far_future = Utc::now() + Duration::days(365);
    assert!(attempt(&db, &policy, &mut far_future, Ok(())).await.is_none());
}

#[tokio::test]
async fn test_success_after_retries_completes() {
    let Some(db) = setup().await else { return };
    let _table = exclusive(&db).await;
    let outbox = OutboxRepository::new(db.clone());
    let policy = RetryPolicy::default();

    let id = OutboxRepository::enqueue(&db, "http://merchant.test/flaky", &json!({}))
        .await
        .unwrap();
    let mut clock = Utc::now() + Duration::minutes(1);

    attempt(&db, &policy, &mut clock, Err(DeliveryError::Connection("refused".into())))
        .await
        .unwrap();
    attempt(&db, &policy, &mut clock, Err(DeliveryError::Status(502)))
        .await
        .unwrap();
    let (_, transition) = attempt(&db, &policy, &mut clock, Ok(())).await.unwrap();

    assert_eq!(transition, JobTransition::Complete { attempts: 3 });
    let job = outbox.find(id).await.unwrap().unwrap();
    assert_eq!(status(&job), JobStatus::Completed);
    assert_eq!(job.attempts, 3);
    let mut far_future = Utc::now() + Duration::days(365);
    assert!(attempt(&db, &policy, &mut far_future, Ok(())).await.is_none());
}
