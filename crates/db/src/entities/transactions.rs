//! `SeaORM` Entity for transactions table.

use chrono::Utc;
use paylane_core::ledger::Transaction;
use paylane_shared::types::TransactionId;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{CurrencyCode, TransactionState};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub amount: i64,
    pub currency: CurrencyCode,
    pub description: String,
    pub status: TransactionState,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Transaction {
    fn from(model: Model) -> Self {
        Self {
            id: TransactionId::from_uuid(model.id),
            amount: model.amount,
            currency: model.currency.into(),
            description: model.description,
            status: model.status.into(),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
