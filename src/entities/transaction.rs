//! Transaction entity - Append-only audit record of one completed money movement.
//!
//! `to_account_id` is set when the destination is an account (user-to-user sends,
//! savings and cash-in movements). External destinations are described by
//! `counterparty` plus the bank or bill columns. Rows are never updated or deleted.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Account the movement was initiated from
    pub from_account_id: i64,
    /// Destination account, if the money landed in one
    pub to_account_id: Option<i64>,
    /// Human-readable destination (username, bank name, bill type, "savings")
    pub counterparty: Option<String>,
    /// Amount moved in minor units, always positive
    pub amount: i64,
    /// Type tag: `"send_money"`, `"bank_transfer"`, `"bill_payment"`, `"cash_in"` or `"add_to_savings"`
    pub transaction_type: String,
    /// External bank involved, for bank transfers and cash-ins
    pub bank_name: Option<String>,
    /// External account number involved, for bank transfers and cash-ins
    pub bank_account_number: Option<String>,
    /// Bill settled, for bill payments
    pub bill_id: Option<i64>,
    /// When the movement completed
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
