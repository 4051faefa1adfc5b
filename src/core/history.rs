//! Read-side queries: movement history, bills, notifications and the account overview.

use crate::{
    core::{
        ledger::{self, Pool},
        money::Money,
        recorder::NotificationType,
        session::Session,
    },
    entities::{Bill, Notification, Transaction, User, bill, notification, transaction},
    errors::{Error, Result},
};
use sea_orm::{Condition, PaginatorTrait, QueryOrder, prelude::*, sea_query::Expr};
use serde::Serialize;

/// Headline figures for the home screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountOverview {
    /// Public username
    pub username: String,
    /// Contact email
    pub email: String,
    /// Checking balance
    pub balance: Money,
    /// Savings balance
    pub savings_balance: Money,
}

/// Lists a user's send, receive and bank-transfer notifications, newest first.
pub async fn list_movement_history<C>(db: &C, user_id: &str) -> Result<Vec<notification::Model>>
where
    C: ConnectionTrait,
{
    let types = NotificationType::MOVEMENT_HISTORY.map(NotificationType::as_str);

    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::NotificationType.is_in(types))
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every notification of a user, newest first.
pub async fn list_notifications<C>(db: &C, user_id: &str) -> Result<Vec<notification::Model>>
where
    C: ConnectionTrait,
{
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .order_by_desc(notification::Column::CreatedAt)
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of notifications the user has not read yet.
pub async fn count_unread_notifications<C>(db: &C, user_id: &str) -> Result<u64>
where
    C: ConnectionTrait,
{
    Notification::find()
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Marks all of a user's notifications as read, returning how many changed.
pub async fn mark_notifications_read<C>(db: &C, user_id: &str) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Notification::update_many()
        .col_expr(notification::Column::IsRead, Expr::value(true))
        .filter(notification::Column::UserId.eq(user_id))
        .filter(notification::Column::IsRead.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Lists a user's unpaid bills, soonest due first.
pub async fn list_unpaid_bills<C>(db: &C, user_id: &str) -> Result<Vec<bill::Model>>
where
    C: ConnectionTrait,
{
    Bill::find()
        .filter(bill::Column::UserId.eq(user_id))
        .filter(bill::Column::Paid.eq(false))
        .order_by_asc(bill::Column::DueDate)
        .order_by_asc(bill::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists transactions that left or reached an account, newest first.
pub async fn list_transactions_for_account<C>(
    db: &C,
    account_id: i64,
) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find()
        .filter(
            Condition::any()
                .add(transaction::Column::FromAccountId.eq(account_id))
                .add(transaction::Column::ToAccountId.eq(account_id)),
        )
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Savings balance of the session account.
///
/// # Errors
/// Returns [`Error::AccountNotFound`] if the account has no savings pool.
pub async fn savings_balance<C>(db: &C, session: &Session) -> Result<Money>
where
    C: ConnectionTrait,
{
    ledger::pool_balance(db, Pool::Savings(session.account_id)).await
}

/// Profile and balances for the session user.
///
/// # Errors
/// Returns [`Error::AccountNotFound`] if the user, account or savings pool is missing.
pub async fn account_overview<C>(db: &C, session: &Session) -> Result<AccountOverview>
where
    C: ConnectionTrait,
{
    let user = User::find_by_id(session.user_id.as_str())
        .one(db)
        .await?
        .ok_or_else(|| Error::AccountNotFound {
            account: format!("user {}", session.user_id),
        })?;

    Ok(AccountOverview {
        username: user.username,
        email: user.email,
        balance: ledger::get_balance(db, session.account_id).await?,
        savings_balance: savings_balance(db, session).await?,
    })
}
