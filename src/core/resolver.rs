//! Counterparty resolution.
//!
//! Turns what a customer types (a username, a bank name and account number) into the
//! rows a movement writes to.

use crate::{
    entities::{Account, BankLink, User, account, bank_link, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*};

/// Required length of an external bank account number.
pub const BANK_ACCOUNT_NUMBER_LEN: usize = 10;

/// An external bank account identified by bank name and account number.
///
/// Only the shape of the number is checked; the bank itself is never contacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankCounterparty {
    bank_name: String,
    account_number: String,
}

impl BankCounterparty {
    /// Validates and normalises a bank name and account number.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if the bank name is blank or the account number is
    /// not exactly ten digits.
    pub fn new(bank_name: &str, account_number: &str) -> Result<Self> {
        let bank_name = bank_name.trim();
        if bank_name.is_empty() {
            return Err(Error::validation("Please enter a valid bank name."));
        }

        let account_number = account_number.trim();
        validate_bank_account_number(account_number)?;

        Ok(Self {
            bank_name: bank_name.to_string(),
            account_number: account_number.to_string(),
        })
    }

    /// The bank's name as entered.
    #[must_use]
    pub fn bank_name(&self) -> &str {
        &self.bank_name
    }

    /// The ten-digit account number.
    #[must_use]
    pub fn account_number(&self) -> &str {
        &self.account_number
    }
}

/// Checks that an external account number is exactly ten ASCII digits.
///
/// # Errors
/// Returns [`Error::Validation`] otherwise.
pub fn validate_bank_account_number(account_number: &str) -> Result<()> {
    if account_number.is_empty() {
        return Err(Error::validation(
            "Please enter a valid bank account number.",
        ));
    }
    if account_number.len() != BANK_ACCOUNT_NUMBER_LEN
        || !account_number.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(Error::validation(format!(
            "Bank account number must be exactly {BANK_ACCOUNT_NUMBER_LEN} digits."
        )));
    }
    Ok(())
}

/// Finds a user by username.
pub async fn find_user_by_username<C>(db: &C, username: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Resolves a recipient username to that user's checking account.
///
/// Usernames are unique, so at most one user matches.
///
/// # Errors
/// Returns [`Error::CounterpartyNotFound`] if the username is unknown or the user has
/// no account.
pub async fn resolve_by_username<C>(db: &C, username: &str) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let not_found = || Error::CounterpartyNotFound {
        counterparty: format!("Recipient '{username}'"),
    };

    let recipient = find_user_by_username(db, username)
        .await?
        .ok_or_else(not_found)?;

    Account::find()
        .filter(account::Column::UserId.eq(recipient.user_id))
        .order_by_asc(account::Column::AccountId)
        .one(db)
        .await?
        .ok_or_else(not_found)
}

/// Looks up the bank link an account holds for a bank counterparty.
pub async fn find_bank_link<C>(
    db: &C,
    account_id: i64,
    bank: &BankCounterparty,
) -> Result<Option<bank_link::Model>>
where
    C: ConnectionTrait,
{
    BankLink::find()
        .filter(bank_link::Column::AccountId.eq(account_id))
        .filter(bank_link::Column::BankName.eq(bank.bank_name()))
        .filter(bank_link::Column::BankAccountNumber.eq(bank.account_number()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every bank link of an account, alphabetically by bank.
pub async fn list_bank_links<C>(db: &C, account_id: i64) -> Result<Vec<bank_link::Model>>
where
    C: ConnectionTrait,
{
    BankLink::find()
        .filter(bank_link::Column::AccountId.eq(account_id))
        .order_by_asc(bank_link::Column::BankName)
        .order_by_asc(bank_link::Column::BankAccountNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_bank_counterparty_validation() {
        assert!(BankCounterparty::new("BDO", "1234567890").is_ok());
        assert!(BankCounterparty::new("  BDO ", " 1234567890 ").is_ok());

        for (bank, number) in [
            ("", "1234567890"),
            ("   ", "1234567890"),
            ("BDO", ""),
            ("BDO", "123456789"),
            ("BDO", "12345678901"),
            ("BDO", "12345abcde"),
        ] {
            let result = BankCounterparty::new(bank, number);
            assert!(
                matches!(result, Err(Error::Validation { .. })),
                "({bank:?}, {number:?}) should be rejected"
            );
        }
    }

    #[test]
    fn test_bank_counterparty_is_trimmed() {
        let bank = BankCounterparty::new("  BPI ", "0987654321 ").unwrap();
        assert_eq!(bank.bank_name(), "BPI");
        assert_eq!(bank.account_number(), "0987654321");
    }

    #[tokio::test]
    async fn test_resolve_by_username() -> Result<()> {
        let db = setup_test_db().await?;
        let maria = create_test_customer(&db, "maria", "10.00").await?;

        let account = resolve_by_username(&db, "maria").await?;
        assert_eq!(account.account_id, maria.account_id);
        assert_eq!(account.user_id, maria.user_id);

        Ok(())
    }

    #[tokio::test]
    async fn test_resolve_unknown_username() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_customer(&db, "maria", "10.00").await?;

        let result = resolve_by_username(&db, "Maria").await;
        assert!(matches!(result, Err(Error::CounterpartyNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_find_bank_link_matches_exact_pair() -> Result<()> {
        let db = setup_test_db().await?;
        let juan = create_test_customer(&db, "juan", "0.00").await?;
        let bdo = BankCounterparty::new("BDO", "1234567890")?;
        let link = create_test_bank_link(&db, juan.account_id, &bdo, "100.00").await?;

        let found = find_bank_link(&db, juan.account_id, &bdo).await?;
        assert_eq!(found, Some(link));

        let other_number = BankCounterparty::new("BDO", "1234567899")?;
        assert!(find_bank_link(&db, juan.account_id, &other_number).await?.is_none());

        let links = list_bank_links(&db, juan.account_id).await?;
        assert_eq!(links.len(), 1);

        Ok(())
    }
}
