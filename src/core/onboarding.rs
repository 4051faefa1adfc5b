//! Customer onboarding - The rows created at sign-up.
//!
//! Authentication itself belongs to the identity provider. Once it has issued a
//! `user_id`, [`open_customer`] creates the user profile, a checking account with the
//! opening balance, and an empty savings pool, all in one database transaction.

use crate::{
    core::{ledger, money::Money, session::Session},
    entities::{User, account, savings, user},
    errors::{Error, Result},
};
use sea_orm::{Condition, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Sign-up details for a new customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    /// Identifier issued by the identity provider
    pub user_id: String,
    /// Desired public username
    pub username: String,
    /// Contact email
    pub email: String,
    /// Opening checking balance
    pub initial_balance: Money,
}

/// Everything created for a new customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedCustomer {
    /// The user profile
    pub user: user::Model,
    /// The checking account
    pub account: account::Model,
    /// The savings pool, starting at zero
    pub savings: savings::Model,
}

impl OpenedCustomer {
    /// A session for the freshly opened customer.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(self.user.user_id.clone(), self.account.account_id)
    }
}

/// Registers a customer: user row, checking account and savings pool.
///
/// # Errors
/// Returns [`Error::Validation`] if a field is blank, the email is malformed, the
/// opening balance is negative, or the email, username or user id is already taken.
#[instrument(skip(db, customer), fields(username = %customer.username))]
pub async fn open_customer(db: &DatabaseConnection, customer: NewCustomer) -> Result<OpenedCustomer> {
    let username = customer.username.trim().to_string();
    let email = customer.email.trim().to_string();

    if customer.user_id.trim().is_empty() || username.is_empty() || email.is_empty() {
        return Err(Error::validation("Please fill in all fields."));
    }
    if !email.contains('@') {
        return Err(Error::validation("Please enter a valid email address."));
    }
    if customer.initial_balance.minor_units() < 0 {
        return Err(Error::validation("Initial balance cannot be negative."));
    }

    let txn = db.begin().await?;

    let existing = User::find()
        .filter(
            Condition::any()
                .add(user::Column::UserId.eq(customer.user_id.as_str()))
                .add(user::Column::Email.eq(email.as_str()))
                .add(user::Column::Username.eq(username.as_str())),
        )
        .one(&txn)
        .await?;
    if let Some(existing) = existing {
        let message = if existing.email == email {
            "A user with this email already exists."
        } else if existing.username == username {
            "A user with this username already exists."
        } else {
            "This user is already registered."
        };
        return Err(Error::validation(message));
    }

    let now = chrono::Utc::now();
    let user = user::ActiveModel {
        user_id: Set(customer.user_id),
        username: Set(username),
        email: Set(email),
        created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let account = account::ActiveModel {
        user_id: Set(user.user_id.clone()),
        account_type: Set(account::CHECKING.to_string()),
        balance: Set(customer.initial_balance.minor_units()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let savings = ledger::open_savings(&txn, account.account_id).await?;

    txn.commit().await?;

    info!(
        "Opened account {} for {} with balance {}",
        account.account_id, user.username, customer.initial_balance
    );
    Ok(OpenedCustomer {
        user,
        account,
        savings,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{Account, Savings};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn customer(user_id: &str, username: &str, email: &str) -> NewCustomer {
        NewCustomer {
            user_id: user_id.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            initial_balance: Money::from_major(1000),
        }
    }

    #[tokio::test]
    async fn test_open_customer_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = open_customer(&db, customer("u1", "", "a@b.c")).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = open_customer(&db, customer("u1", "juan", "not-an-email")).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = open_customer(
            &db,
            NewCustomer {
                initial_balance: Money::from_minor(-1),
                ..customer("u1", "juan", "juan@example.com")
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_open_customer_creates_user_account_and_savings() -> Result<()> {
        let db = setup_test_db().await?;

        let opened = open_customer(&db, customer("u1", " juan ", "juan@example.com")).await?;
        assert_eq!(opened.user.username, "juan");
        assert_eq!(opened.account.account_type, "Checking");
        assert_eq!(opened.account.balance, 100_000);
        assert_eq!(opened.savings.account_id, opened.account.account_id);
        assert_eq!(opened.savings.balance, 0);

        let stored = Account::find_by_id(opened.account.account_id).one(&db).await?;
        assert_eq!(stored, Some(opened.account.clone()));
        let stored = Savings::find_by_id(opened.account.account_id).one(&db).await?;
        assert!(stored.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_and_username_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        open_customer(&db, customer("u1", "juan", "juan@example.com")).await?;

        let err = open_customer(&db, customer("u2", "juanito", "juan@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "A user with this email already exists.");

        let err = open_customer(&db, customer("u3", "juan", "other@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "A user with this username already exists.");

        // Nothing half-created for the rejected sign-ups
        assert_eq!(Account::find().all(&db).await?.len(), 1);

        Ok(())
    }
}
