//! Bank link entity - Cumulative funds moved to one external bank account.
//!
//! A row is keyed by `(account_id, bank_name, bank_account_number)`. Repeat transfers
//! to the same pair add to `balance`; they never replace it. Cash-ins draw it down.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Bank link database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "banks")]
pub struct Model {
    /// Unique identifier for the link
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Account that owns this link
    pub account_id: i64,
    /// External bank name (e.g., "BDO")
    pub bank_name: String,
    /// Ten-digit external account number
    pub bank_account_number: String,
    /// Linked balance in minor units
    pub balance: i64,
    /// When the link was first created
    pub created_at: DateTimeUtc,
    /// When the linked balance last changed
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
