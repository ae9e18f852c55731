//! `SeaORM` entities.

pub mod accounts;
pub mod entries;
pub mod idempotency_keys;
pub mod sea_orm_active_enums;
pub mod transactions;
pub mod webhook_jobs;
