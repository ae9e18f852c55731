//! Outbox worker.
//!
//! Each iteration claims one eligible job inside a transaction, attempts
//! delivery while holding the row lock, writes the outcome, and commits. Any
//! number of workers, in one process or many, can drain the same outbox.
//! When the outbox is empty the worker sleeps for the poll interval.

use std::time::Duration;

use chrono::Utc;
use paylane_core::webhook::{
    JobTransition, RetryPolicy, WebhookSigner, after_delivery, malformed_payload,
};
use paylane_db::OutboxRepository;
use paylane_shared::WebhookConfig;
use paylane_shared::types::WebhookJobId;
use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::client::{WebhookClient, WebhookSender};

/// Builds the retry policy described by `config`.
#[must_use]
pub fn retry_policy(config: &WebhookConfig) -> RetryPolicy {
    RetryPolicy::new(
        config.max_attempts,
        Duration::from_secs(config.base_backoff_secs),
        Duration::from_secs(config.max_backoff_secs),
    )
}

/// Background task draining the webhook outbox.
#[derive(Debug, Clone)]
pub struct WebhookWorker<S = WebhookClient> {
    db: DatabaseConnection,
    sender: S,
    policy: RetryPolicy,
    poll_interval: Duration,
}

impl WebhookWorker<WebhookClient> {
    /// Creates a worker delivering with a signed [`WebhookClient`].
    pub fn from_config(
        db: DatabaseConnection,
        config: &WebhookConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = WebhookClient::new(
            WebhookSigner::new(&config.secret),
            Duration::from_secs(config.request_timeout_secs),
        )?;

        Ok(Self::new(
            db,
            client,
            retry_policy(config),
            Duration::from_secs(config.poll_interval_secs),
        ))
    }
}

impl<S: WebhookSender + 'static> WebhookWorker<S> {
    /// Creates a worker.
    #[must_use]
    pub const fn new(
        db: DatabaseConnection,
        sender: S,
        policy: RetryPolicy,
        poll_interval: Duration,
    ) -> Self {
        Self {
            db,
            sender,
            policy,
            poll_interval,
        }
    }

    /// Processes at most one job. Returns `None` when nothing is eligible.
    pub async fn process_next(&self) -> Result<Option<(WebhookJobId, JobTransition)>, DbErr> {
        let txn = self.db.begin().await?;

        let Some(job) = OutboxRepository::claim_next(&txn, Utc::now()).await? else {
            txn.commit().await?;
            return Ok(None);
        };
        let id = WebhookJobId::from_uuid(job.id);

        let transition = if let Err(err) = serde_json::from_str::<serde_json::Value>(&job.payload)
        {
            warn!(job_id = %id, error = %err, "Malformed webhook payload");
            malformed_payload(job.attempts)
        } else {
            let result = self.sender.send(&job.url, job.payload.as_bytes()).await;
            if let Err(err) = &result {
                debug!(job_id = %id, url = %job.url, error = %err, "Webhook delivery failed");
            }
            after_delivery(&self.policy, job.attempts, &result, Utc::now())
        };

        OutboxRepository::apply_transition(&txn, id, &transition).await?;
        txn.commit().await?;

        match transition {
            JobTransition::Complete { attempts } => {
                info!(job_id = %id, attempts, "Webhook delivered");
            }
            JobTransition::Reschedule {
                attempts,
                next_run_at,
            } => {
                info!(job_id = %id, attempts, next_run_at = %next_run_at, "Webhook rescheduled");
            }
            JobTransition::Fail { attempts, reason } => {
                warn!(job_id = %id, attempts, reason = ?reason, "Webhook failed permanently");
            }
        }

        Ok(Some((id, transition)))
    }

    /// Runs until `shutdown` is cancelled. A job in flight is finished first.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(poll_interval = ?self.poll_interval, "Webhook worker started");

        while !shutdown.is_cancelled() {
            let wait = match self.process_next().await {
                Ok(Some(_)) => continue,
                Ok(None) => self.poll_interval,
                Err(err) => {
                    error!(error = %err, "Webhook worker iteration failed");
                    self.poll_interval
                }
            };

            tokio::select! {
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(wait) => {}
            }
        }

        info!("Webhook worker stopped");
    }

    /// Spawns [`run`](Self::run) on the current runtime.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
