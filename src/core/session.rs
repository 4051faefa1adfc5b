//! The acting customer, passed explicitly to every workflow.
//!
//! The identity provider authenticates the user and hands over a `user_id`; a
//! [`Session`] pins that user to their checking account for the duration of a request.

use crate::{
    entities::{Account, account},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*};

/// Identity and account context for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Identity-provider user id
    pub user_id: String,
    /// The user's checking account
    pub account_id: i64,
}

impl Session {
    /// Creates a session from already-known identifiers.
    #[must_use]
    pub fn new(user_id: impl Into<String>, account_id: i64) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
        }
    }

    /// Resolves the user's checking account and builds a session for it.
    ///
    /// If a user somehow owns several accounts, the oldest one is used.
    ///
    /// # Errors
    /// Returns [`Error::AccountNotFound`] if the user has no account.
    pub async fn for_user<C>(db: &C, user_id: &str) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        let account = Account::find()
            .filter(account::Column::UserId.eq(user_id))
            .order_by_asc(account::Column::AccountId)
            .one(db)
            .await?
            .ok_or_else(|| Error::AccountNotFound {
                account: format!("user {user_id}"),
            })?;

        Ok(Self::new(user_id, account.account_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_for_user_resolves_checking_account() -> Result<()> {
        let db = setup_test_db().await?;
        let juan = create_test_customer(&db, "juan", "1000.00").await?;

        let session = Session::for_user(&db, &juan.user_id).await?;
        assert_eq!(session, juan);

        Ok(())
    }

    #[tokio::test]
    async fn test_for_user_without_account() -> Result<()> {
        let db = setup_test_db().await?;

        let result = Session::for_user(&db, "ghost").await;
        assert!(matches!(result, Err(Error::AccountNotFound { .. })));

        Ok(())
    }
}
