//! Savings entity - A separate balance pool, one per account.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Savings database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "savings")]
pub struct Model {
    /// The account this savings pool belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: i64,
    /// Savings balance in minor units
    pub balance: i64,
    /// When the balance last changed
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::AccountId"
    )]
    Account,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
