//! Webhook outbox repository.
//!
//! Jobs are enqueued on the caller's connection, normally the transaction that
//! performs the business change they report on. The worker claims one job at
//! a time with `FOR UPDATE SKIP LOCKED` and holds the row lock until it has
//! written the outcome.

use chrono::{DateTime, Utc};
use paylane_core::webhook::{JobStatus, JobTransition};
use paylane_shared::types::WebhookJobId;
use sea_orm::sea_query::{LockBehavior, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use crate::entities::{sea_orm_active_enums::WebhookJobStatus, webhook_jobs};

/// Outbox repository.
#[derive(Debug, Clone)]
pub struct OutboxRepository {
    db: DatabaseConnection,
}

impl OutboxRepository {
    /// Creates a new outbox repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a job by ID.
    pub async fn find(&self, id: WebhookJobId) -> Result<Option<webhook_jobs::Model>, DbErr> {
        webhook_jobs::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
    }

    /// Writes a pending job, eligible immediately.
    pub async fn enqueue<C>(
        conn: &C,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<WebhookJobId, DbErr>
    where
        C: ConnectionTrait,
    {
        Self::enqueue_raw(conn, url, payload.to_string()).await
    }

    /// Writes a pending job with a pre-serialized payload.
    pub async fn enqueue_raw<C>(conn: &C, url: &str, payload: String) -> Result<WebhookJobId, DbErr>
    where
        C: ConnectionTrait,
    {
        let id = WebhookJobId::new();
        let now = Utc::now().into();

        webhook_jobs::ActiveModel {
            id: Set(id.into_inner()),
            url: Set(url.to_string()),
            payload: Set(payload),
            status: Set(JobStatus::Pending.into()),
            attempts: Set(0),
            next_run_at: Set(now),
            created_at: Set(now),
        }
        .insert(conn)
        .await?;

        debug!(job_id = %id, url, "Webhook job enqueued");
        Ok(id)
    }

    /// Locks the oldest eligible pending job, skipping rows another worker holds.
    ///
    /// `conn` must be a transaction; the lock lasts until it ends.
    pub async fn claim_next<C>(
        conn: &C,
        now: DateTime<Utc>,
    ) -> Result<Option<webhook_jobs::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        webhook_jobs::Entity::find()
            .filter(webhook_jobs::Column::Status.eq(WebhookJobStatus::Pending))
            .filter(webhook_jobs::Column::NextRunAt.lte(now))
            .order_by_asc(webhook_jobs::Column::CreatedAt)
            .order_by_asc(webhook_jobs::Column::Id)
            .limit(1)
            .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
            .one(conn)
            .await
    }

    /// Persists the outcome of an attempt on a claimed job.
    pub async fn apply_transition<C>(
        conn: &C,
        id: WebhookJobId,
        transition: &JobTransition,
    ) -> Result<webhook_jobs::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut job = webhook_jobs::ActiveModel {
            id: Set(id.into_inner()),
            status: Set(transition.status().into()),
            ..Default::default()
        };

        match *transition {
            JobTransition::Complete { attempts } | JobTransition::Fail { attempts, .. } => {
                job.attempts = Set(attempts);
            }
            JobTransition::Reschedule {
                attempts,
                next_run_at,
            } => {
                job.attempts = Set(attempts);
                job.next_run_at = Set(next_run_at.into());
            }
        }

        job.update(conn).await
    }
}
