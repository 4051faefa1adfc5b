//! User entity - A customer known to the bank.
//!
//! The `user_id` is assigned by the external identity provider at sign-up, so it is
//! not generated here. Usernames and emails are unique.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Identifier issued by the identity provider
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Public handle other customers send money to (e.g., "juan123")
    #[sea_orm(unique)]
    pub username: String,
    /// Contact email used for sign-in
    #[sea_orm(unique)]
    pub email: String,
    /// When the user signed up
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many accounts
    #[sea_orm(has_many = "super::account::Entity")]
    Accounts,
    /// One user owns many bills
    #[sea_orm(has_many = "super::bill::Entity")]
    Bills,
    /// One user receives many notifications
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::bill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bills.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
