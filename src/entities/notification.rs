//! Notification entity - Messages shown in a user's activity feed.
//!
//! Append-only apart from the `is_read` flag. The `notification_type` drives the
//! movement-history filter, so its set of values is fixed (see `core::recorder`).
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    /// Unique identifier for the notification
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User the notification is addressed to
    pub user_id: String,
    /// Short headline (e.g., "Money Sent")
    pub title: String,
    /// Full message text
    pub message: String,
    /// Type tag, e.g. `"send_money"` or `"receive_money"`
    pub notification_type: String,
    /// When the notification was created
    pub created_at: DateTimeUtc,
    /// Whether the user has seen it
    pub is_read: bool,
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
