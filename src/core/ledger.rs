//! Ledger accessor - Reads and writes balances.
//!
//! There are three balance pools: a customer's checking account, the savings pool
//! attached to it, and the linked balance of an external bank account. Workflows move
//! money between pools with [`debit`] and [`credit`], each a single SQL statement:
//!
//! `UPDATE ... SET balance = balance - :amount WHERE id = :id AND balance >= :amount`
//!
//! A debit therefore cannot take a balance below zero, even when two movements race on
//! the same account. Both accept any [`ConnectionTrait`] so they compose inside a
//! database transaction.

use crate::{
    core::money::Money,
    entities::{Account, BankLink, Savings, account, bank_link, savings},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*, sea_query::Expr};
use tracing::debug;

/// A balance that money can be moved into or out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    /// A checking account, by account id
    Account(i64),
    /// The savings pool of an account, by account id
    Savings(i64),
    /// A linked external bank account, by bank link id
    BankLink(i64),
}

impl Pool {
    fn not_found(self) -> Error {
        match self {
            Self::Account(id) => Error::AccountNotFound {
                account: format!("account {id}"),
            },
            Self::Savings(id) => Error::AccountNotFound {
                account: format!("savings of account {id}"),
            },
            Self::BankLink(id) => Error::CounterpartyNotFound {
                counterparty: format!("Bank link {id}"),
            },
        }
    }
}

/// Columns a balance-bearing entity exposes to the shared update logic.
struct BalanceColumns<E: EntityTrait> {
    key: E::Column,
    balance: E::Column,
    updated_at: Option<E::Column>,
}

/// Reads a checking account balance.
///
/// # Errors
/// Returns [`Error::AccountNotFound`] if the account does not exist.
pub async fn get_balance<C>(db: &C, account_id: i64) -> Result<Money>
where
    C: ConnectionTrait,
{
    pool_balance(db, Pool::Account(account_id)).await
}

/// Overwrites a checking account balance.
///
/// No sign check happens here; callers validate before writing. Workflows use
/// [`debit`]/[`credit`] instead, which cannot lose concurrent updates.
///
/// # Errors
/// Returns [`Error::WriteFailed`] if no row was updated.
pub async fn set_balance<C>(db: &C, account_id: i64, new_balance: Money) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Account::update_many()
        .col_expr(
            account::Column::Balance,
            Expr::value(new_balance.minor_units()),
        )
        .filter(account::Column::AccountId.eq(account_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::WriteFailed {
            message: format!("account {account_id} was not updated"),
        });
    }
    Ok(())
}

/// Reads the balance of any pool.
///
/// # Errors
/// Returns [`Error::AccountNotFound`] for a missing account or savings pool and
/// [`Error::CounterpartyNotFound`] for a missing bank link.
pub async fn pool_balance<C>(db: &C, pool: Pool) -> Result<Money>
where
    C: ConnectionTrait,
{
    let balance = match pool {
        Pool::Account(id) => Account::find_by_id(id).one(db).await?.map(|a| a.balance),
        Pool::Savings(id) => Savings::find_by_id(id).one(db).await?.map(|s| s.balance),
        Pool::BankLink(id) => BankLink::find_by_id(id).one(db).await?.map(|b| b.balance),
    };

    balance.map(Money::from_minor).ok_or_else(|| pool.not_found())
}

/// Removes `amount` from a pool if, and only if, the pool holds at least that much.
///
/// Returns the balance after the debit.
///
/// # Errors
/// Returns [`Error::InsufficientFunds`] if the balance is lower than `amount`, or a
/// not-found error if the pool does not exist. Nothing is written in either case.
pub async fn debit<C>(db: &C, pool: Pool, amount: Money) -> Result<Money>
where
    C: ConnectionTrait,
{
    ensure_positive(amount)?;
    let delta = -amount.minor_units();

    let rows = shift_pool(db, pool, delta, Some(amount)).await?;
    if rows == 0 {
        // Either the row is missing or the guard rejected it.
        let current = pool_balance(db, pool).await?;
        return Err(Error::InsufficientFunds {
            current: current.minor_units(),
            required: amount.minor_units(),
        });
    }

    let balance = pool_balance(db, pool).await?;
    debug!("Debited {amount} from {pool:?}, balance now {balance}");
    Ok(balance)
}

/// Adds `amount` to a pool and returns the balance after the credit.
///
/// # Errors
/// Returns a not-found error if the pool does not exist, or [`Error::WriteFailed`] if
/// the new balance would not fit in the balance column. Nothing is written in either case.
pub async fn credit<C>(db: &C, pool: Pool, amount: Money) -> Result<Money>
where
    C: ConnectionTrait,
{
    ensure_positive(amount)?;

    let rows = shift_pool(db, pool, amount.minor_units(), None).await?;
    if rows == 0 {
        // Either the row is missing or the balance would overflow.
        let current = pool_balance(db, pool).await?;
        return Err(Error::WriteFailed {
            message: format!("crediting {amount} to {pool:?} would overflow balance {current}"),
        });
    }

    let balance = pool_balance(db, pool).await?;
    debug!("Credited {amount} to {pool:?}, balance now {balance}");
    Ok(balance)
}

/// Creates the savings pool for an account with a zero balance.
pub async fn open_savings<C>(db: &C, account_id: i64) -> Result<savings::Model>
where
    C: ConnectionTrait,
{
    let model = savings::ActiveModel {
        account_id: Set(account_id),
        balance: Set(0),
        updated_at: Set(chrono::Utc::now()),
    };
    model.insert(db).await.map_err(Into::into)
}

fn ensure_positive(amount: Money) -> Result<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(Error::validation("Amount must be greater than zero."))
    }
}

async fn shift_pool<C>(db: &C, pool: Pool, delta: i64, cover: Option<Money>) -> Result<u64>
where
    C: ConnectionTrait,
{
    match pool {
        Pool::Account(id) => {
            let columns = BalanceColumns::<Account> {
                key: account::Column::AccountId,
                balance: account::Column::Balance,
                updated_at: None,
            };
            shift_balance(db, &columns, id, delta, cover).await
        }
        Pool::Savings(id) => {
            let columns = BalanceColumns::<Savings> {
                key: savings::Column::AccountId,
                balance: savings::Column::Balance,
                updated_at: Some(savings::Column::UpdatedAt),
            };
            shift_balance(db, &columns, id, delta, cover).await
        }
        Pool::BankLink(id) => {
            let columns = BalanceColumns::<BankLink> {
                key: bank_link::Column::Id,
                balance: bank_link::Column::Balance,
                updated_at: Some(bank_link::Column::UpdatedAt),
            };
            shift_balance(db, &columns, id, delta, cover).await
        }
    }
}

/// `balance = balance + delta` on one row, optionally guarded by `balance >= cover`.
///
/// Positive deltas only apply while the result fits in an `i64`.
async fn shift_balance<C, E>(
    db: &C,
    columns: &BalanceColumns<E>,
    key: i64,
    delta: i64,
    cover: Option<Money>,
) -> Result<u64>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let mut update = E::update_many()
        .col_expr(columns.balance, Expr::col(columns.balance).add(delta))
        .filter(columns.key.eq(key));

    if let Some(updated_at) = columns.updated_at {
        update = update.col_expr(updated_at, Expr::value(chrono::Utc::now()));
    }
    if let Some(cover) = cover {
        update = update.filter(columns.balance.gte(cover.minor_units()));
    }
    if delta > 0 {
        update = update.filter(columns.balance.lte(i64::MAX - delta));
    }

    let result = update.exec(db).await?;
    Ok(result.rows_affected)
}
