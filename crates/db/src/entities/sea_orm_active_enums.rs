//! `SeaORM` active enums and their mapping to domain types.

use paylane_core::ledger::{Direction, TransactionStatus};
use paylane_core::webhook::JobStatus;
use paylane_shared::types::Currency;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `currency` column of `accounts` and `transactions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(3))")]
pub enum CurrencyCode {
    #[sea_orm(string_value = "USD")]
    Usd,
    #[sea_orm(string_value = "TZS")]
    Tzs,
}

/// `direction` column of `entries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(6))")]
pub enum EntryDirection {
    #[sea_orm(string_value = "DEBIT")]
    Debit,
    #[sea_orm(string_value = "CREDIT")]
    Credit,
}

/// `status` column of `transactions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TransactionState {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "FAILED")]
    Failed,
}

/// `status` column of `webhook_jobs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum WebhookJobStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "FAILED")]
    Failed,
}

impl From<Currency> for CurrencyCode {
    fn from(value: Currency) -> Self {
        match value {
            Currency::Usd => Self::Usd,
            Currency::Tzs => Self::Tzs,
        }
    }
}

impl From<CurrencyCode> for Currency {
    fn from(value: CurrencyCode) -> Self {
        match value {
            CurrencyCode::Usd => Self::Usd,
            CurrencyCode::Tzs => Self::Tzs,
        }
    }
}

impl From<Direction> for EntryDirection {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Debit => Self::Debit,
            Direction::Credit => Self::Credit,
        }
    }
}

impl From<EntryDirection> for Direction {
    fn from(value: EntryDirection) -> Self {
        match value {
            EntryDirection::Debit => Self::Debit,
            EntryDirection::Credit => Self::Credit,
        }
    }
}

impl From<TransactionStatus> for TransactionState {
    fn from(value: TransactionStatus) -> Self {
        match value {
            TransactionStatus::Pending => Self::Pending,
            TransactionStatus::Completed => Self::Completed,
            TransactionStatus::Failed => Self::Failed,
        }
    }
}

impl From<TransactionState> for TransactionStatus {
    fn from(value: TransactionState) -> Self {
        match value {
            TransactionState::Pending => Self::Pending,
            TransactionState::Completed => Self::Completed,
            TransactionState::Failed => Self::Failed,
        }
    }
}

impl From<JobStatus> for WebhookJobStatus {
    fn from(value: JobStatus) -> Self {
        match value {
            JobStatus::Pending => Self::Pending,
            JobStatus::Completed => Self::Completed,
            JobStatus::Failed => Self::Failed,
        }
    }
}

impl From<WebhookJobStatus> for JobStatus {
    fn from(value: WebhookJobStatus) -> Self {
        match value {
            WebhookJobStatus::Pending => Self::Pending,
            WebhookJobStatus::Completed => Self::Completed,
            WebhookJobStatus::Failed => Self::Failed,
        }
    }
}
