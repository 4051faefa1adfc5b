//! Bill entity - A payable created outside the app (utility provider feed, seeding).
//!
//! Only the bill-payment workflow mutates a bill, flipping `paid` from false to true
//! exactly once and stamping `paid_at`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Bill database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    /// Unique identifier for the bill
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who owes the bill
    pub user_id: String,
    /// What the bill is for (e.g., "Electricity", "Water")
    pub bill_type: String,
    /// Amount due in minor units
    pub amount: i64,
    /// Date the bill falls due
    pub due_date: Date,
    /// Whether the bill has been settled
    pub paid: bool,
    /// When the bill was settled
    pub paid_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::UserId"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
