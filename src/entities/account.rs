//! Account entity - A customer's spendable balance.
//!
//! Balances are stored in minor currency units (centavos) so that every update the
//! workflows issue in SQL is exact. A balance never goes below zero.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account type assigned at sign-up.
pub const CHECKING: &str = "Checking";

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub account_id: i64,
    /// Owning user
    pub user_id: String,
    /// Kind of account, `"Checking"` in practice
    pub account_type: String,
    /// Current balance in minor units
    pub balance: i64,
    /// When the account was opened
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each account belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::UserId"
    )]
    User,
    /// One account has exactly one savings pool
    #[sea_orm(has_one = "super::savings::Entity")]
    Savings,
    /// One account has many linked external bank accounts
    #[sea_orm(has_many = "super::bank_link::Entity")]
    BankLinks,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::savings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Savings.def()
    }
}

impl Related<super::bank_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
