//! Money-movement workflow.
//!
//! Every way money moves (sending to another customer, transferring out to a bank,
//! paying a bill, cashing in from a bank, moving to or from savings) runs through
//! [`execute`]. One call is one database transaction:
//!
//! 1. validate the request (done when the [`Movement`] is built, and again here)
//! 2. read the source balance and reject if it cannot cover the amount
//! 3. resolve the counterparty
//! 4. debit the source with a guarded decrement, credit the destination
//! 5. append one transaction row
//! 6. append the notifications, inside or after the transaction per [`NotificationPolicy`]
//!
//! Any error before commit rolls back every write of the movement.

use crate::{
    core::{
        bills,
        ledger::{self, Pool},
        money::Money,
        recorder::{self, NewNotification, NewTransaction, NotificationType, TransactionType},
        resolver::{self, BankCounterparty},
        session::Session,
    },
    entities::{User, bank_link, notification, transaction},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// What happens to a movement when its notifications cannot be written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPolicy {
    /// Notifications are part of the movement; if they fail, nothing is applied.
    #[default]
    Atomic,
    /// The movement commits first; a notification failure is logged and reported on
    /// the receipt but does not undo the movement.
    BestEffort,
}

/// Direction of a savings transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavingsDirection {
    /// Checking account to savings
    Deposit,
    /// Savings back to the checking account
    Withdraw,
}

/// A requested movement of money on behalf of the session user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Movement {
    /// Send to another customer by username; both sides are notified.
    SendToUser {
        /// Recipient's username
        recipient_username: String,
        /// Amount to send
        amount: Money,
    },
    /// Transfer out to an external bank account, accumulating on its bank link.
    BankTransfer {
        /// Destination bank account
        bank: BankCounterparty,
        /// Amount to transfer
        amount: Money,
    },
    /// Pay one of the user's unpaid bills in full.
    BillPayment {
        /// Bill to settle
        bill_id: i64,
    },
    /// Bring money back in from a linked bank account.
    CashIn {
        /// Source bank account, which must already be linked
        bank: BankCounterparty,
        /// Amount to cash in
        amount: Money,
    },
    /// Move money between the checking account and savings.
    SavingsTransfer {
        /// Which way the money goes
        direction: SavingsDirection,
        /// Amount to move
        amount: Money,
    },
}

impl Movement {
    /// Builds a send-to-user request from raw input.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for a blank username or an invalid amount.
    pub fn send_to_user(recipient_username: &str, amount: &str) -> Result<Self> {
        let recipient_username = recipient_username.trim();
        if recipient_username.is_empty() || amount.trim().is_empty() {
            return Err(Error::validation("Please fill in all fields."));
        }
        Ok(Self::SendToUser {
            recipient_username: recipient_username.to_string(),
            amount: Money::parse(amount)?,
        })
    }

    /// Builds a bank-transfer request from raw input.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for a blank bank name, an account number that is
    /// not ten digits, or an invalid amount.
    pub fn bank_transfer(bank_name: &str, bank_account_number: &str, amount: &str) -> Result<Self> {
        let amount = Money::parse(amount)?;
        let bank = BankCounterparty::new(bank_name, bank_account_number)?;
        Ok(Self::BankTransfer { bank, amount })
    }

    /// Builds a bill-payment request.
    #[must_use]
    pub const fn bill_payment(bill_id: i64) -> Self {
        Self::BillPayment { bill_id }
    }

    /// Builds a cash-in request from raw input.
    ///
    /// # Errors
    /// Same rules as [`Movement::bank_transfer`].
    pub fn cash_in(bank_name: &str, bank_account_number: &str, amount: &str) -> Result<Self> {
        let amount = Money::parse(amount)?;
        let bank = BankCounterparty::new(bank_name, bank_account_number)?;
        Ok(Self::CashIn { bank, amount })
    }

    /// Builds a savings-transfer request from raw input.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] for an invalid amount.
    pub fn savings_transfer(direction: SavingsDirection, amount: &str) -> Result<Self> {
        Ok(Self::SavingsTransfer {
            direction,
            amount: Money::parse(amount)?,
        })
    }

    /// Short name of the variant, for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SendToUser { .. } => "send_to_user",
            Self::BankTransfer { .. } => "bank_transfer",
            Self::BillPayment { .. } => "bill_payment",
            Self::CashIn { .. } => "cash_in",
            Self::SavingsTransfer { .. } => "savings_transfer",
        }
    }

    /// Re-checks the invariants the constructors enforce, for hand-built values.
    fn validate(&self) -> Result<()> {
        let amount = match self {
            Self::SendToUser {
                recipient_username,
                amount,
            } => {
                if recipient_username.trim().is_empty() {
                    return Err(Error::validation("Please fill in all fields."));
                }
                *amount
            }
            Self::BankTransfer { amount, .. }
            | Self::CashIn { amount, .. }
            | Self::SavingsTransfer { amount, .. } => *amount,
            Self::BillPayment { .. } => return Ok(()),
        };

        if amount.is_positive() {
            Ok(())
        } else {
            Err(Error::validation("Amount must be greater than zero."))
        }
    }
}

/// Outcome of a successful movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementReceipt {
    /// The audit row written for the movement
    pub transaction: transaction::Model,
    /// Notifications written; empty when a best-effort write failed, in which case
    /// none of the movement's notifications were stored
    pub notifications: Vec<notification::Model>,
    /// The session account's balance after the movement
    pub balance: Money,
    /// Why notifications are missing, under [`NotificationPolicy::BestEffort`]
    pub notification_error: Option<String>,
}

/// What a movement wrote before its notifications.
struct Applied {
    transaction: transaction::Model,
    notifications: Vec<NewNotification>,
    balance: Money,
}

/// Runs one movement for the session user.
///
/// # Errors
/// Returns the first error encountered: [`Error::Validation`],
/// [`Error::AccountNotFound`], [`Error::CounterpartyNotFound`],
/// [`Error::InsufficientFunds`], [`Error::BillAlreadyPaid`], [`Error::WriteFailed`], or a
/// database error. No balance, transaction or notification is changed when an error
/// is returned.
#[instrument(
    skip(db, session, movement),
    fields(user_id = %session.user_id, account_id = session.account_id, kind = movement.kind())
)]
pub async fn execute(
    db: &DatabaseConnection,
    session: &Session,
    movement: Movement,
    policy: NotificationPolicy,
) -> Result<MovementReceipt> {
    movement.validate()?;

    let txn = db.begin().await?;
    let applied = apply(&txn, session, &movement)
        .await
        .inspect_err(|e| warn!("Movement rejected: {e}"))?;

    let receipt = match policy {
        NotificationPolicy::Atomic => {
            let notifications = recorder::notify_all(&txn, applied.notifications)
                .await
                .inspect_err(|e| warn!("Rolling back movement, notifications failed: {e}"))?;
            txn.commit().await?;
            MovementReceipt {
                transaction: applied.transaction,
                notifications,
                balance: applied.balance,
                notification_error: None,
            }
        }
        NotificationPolicy::BestEffort => {
            txn.commit().await?;
            match notify_together(db, applied.notifications).await {
                Ok(notifications) => MovementReceipt {
                    transaction: applied.transaction,
                    notifications,
                    balance: applied.balance,
                    notification_error: None,
                },
                Err(e) => {
                    warn!(
                        "Movement {} committed but notifications failed: {e}",
                        applied.transaction.id
                    );
                    MovementReceipt {
                        transaction: applied.transaction,
                        notifications: Vec::new(),
                        balance: applied.balance,
                        notification_error: Some(e.to_string()),
                    }
                }
            }
        }
    };

    info!(
        "{} of {} completed as transaction {}",
        receipt.transaction.transaction_type,
        Money::from_minor(receipt.transaction.amount),
        receipt.transaction.id
    );
    Ok(receipt)
}

/// Writes a movement's notifications in their own transaction, so either all of
/// them are stored or none are.
async fn notify_together(
    db: &DatabaseConnection,
    notifications: Vec<NewNotification>,
) -> Result<Vec<notification::Model>> {
    let txn = db.begin().await?;
    let saved = recorder::notify_all(&txn, notifications).await?;
    txn.commit().await?;
    Ok(saved)
}

async fn apply<C>(db: &C, session: &Session, movement: &Movement) -> Result<Applied>
where
    C: ConnectionTrait,
{
    match movement {
        Movement::SendToUser {
            recipient_username,
            amount,
        } => send_to_user(db, session, recipient_username, *amount).await,
        Movement::BankTransfer { bank, amount } => bank_transfer(db, session, bank, *amount).await,
        Movement::BillPayment { bill_id } => pay_bill(db, session, *bill_id).await,
        Movement::CashIn { bank, amount } => cash_in(db, session, bank, *amount).await,
        Movement::SavingsTransfer { direction, amount } => {
            savings_transfer(db, session, *direction, *amount).await
        }
    }
}

/// Rejects early when the pool cannot cover `amount`.
///
/// The guarded [`ledger::debit`] is what actually enforces the rule; this read only
/// makes the failure surface before counterparty resolution.
async fn ensure_covered<C>(db: &C, pool: Pool, amount: Money) -> Result<Money>
where
    C: ConnectionTrait,
{
    let balance = ledger::pool_balance(db, pool).await?;
    if balance < amount {
        return Err(Error::InsufficientFunds {
            current: balance.minor_units(),
            required: amount.minor_units(),
        });
    }
    Ok(balance)
}

async fn send_to_user<C>(
    db: &C,
    session: &Session,
    recipient_username: &str,
    amount: Money,
) -> Result<Applied>
where
    C: ConnectionTrait,
{
    let source = Pool::Account(session.account_id);
    ensure_covered(db, source, amount).await?;

    let recipient = resolver::resolve_by_username(db, recipient_username).await?;
    if recipient.account_id == session.account_id {
        return Err(Error::validation("You cannot send money to yourself."));
    }

    let balance = ledger::debit(db, source, amount).await?;
    ledger::credit(db, Pool::Account(recipient.account_id), amount).await?;

    let transaction = recorder::record(
        db,
        NewTransaction {
            to_account_id: Some(recipient.account_id),
            counterparty: Some(recipient_username.to_string()),
            ..NewTransaction::new(session.account_id, amount, TransactionType::SendMoney)
        },
    )
    .await?;

    let sender_name = display_name(db, &session.user_id).await?;
    let when = transaction.created_at.format("%Y-%m-%d %H:%M UTC");
    let notifications = vec![
        NewNotification {
            user_id: session.user_id.clone(),
            title: "Money Sent".to_string(),
            message: format!(
                "You sent {} to {recipient_username} on {when}.",
                amount.display_with_symbol()
            ),
            notification_type: NotificationType::SendMoney,
        },
        NewNotification {
            user_id: recipient.user_id,
            title: "Money Received".to_string(),
            message: format!(
                "You received {} from {sender_name}.",
                amount.display_with_symbol()
            ),
            notification_type: NotificationType::ReceiveMoney,
        },
    ];

    Ok(Applied {
        transaction,
        notifications,
        balance,
    })
}

async fn bank_transfer<C>(
    db: &C,
    session: &Session,
    bank: &BankCounterparty,
    amount: Money,
) -> Result<Applied>
where
    C: ConnectionTrait,
{
    let source = Pool::Account(session.account_id);
    ensure_covered(db, source, amount).await?;

    let existing = resolver::find_bank_link(db, session.account_id, bank).await?;

    let balance = ledger::debit(db, source, amount).await?;
    let linked_balance = match existing {
        Some(link) => ledger::credit(db, Pool::BankLink(link.id), amount).await?,
        None => {
            let now = chrono::Utc::now();
            bank_link::ActiveModel {
                account_id: Set(session.account_id),
                bank_name: Set(bank.bank_name().to_string()),
                bank_account_number: Set(bank.account_number().to_string()),
                balance: Set(amount.minor_units()),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await
            .map_err(|e| Error::WriteFailed {
                message: format!("linking {}: {e}", bank.bank_name()),
            })?;
            amount
        }
    };

    let transaction = recorder::record(
        db,
        NewTransaction {
            counterparty: Some(bank.bank_name().to_string()),
            bank_name: Some(bank.bank_name().to_string()),
            bank_account_number: Some(bank.account_number().to_string()),
            ..NewTransaction::new(session.account_id, amount, TransactionType::BankTransfer)
        },
    )
    .await?;

    let notifications = vec![NewNotification {
        user_id: session.user_id.clone(),
        title: "Bank Transfer".to_string(),
        message: format!(
            "You transferred {} to {} account ending in {}. Total transferred to this account: {}.",
            amount.display_with_symbol(),
            bank.bank_name(),
            last_four(bank.account_number()),
            linked_balance.display_with_symbol()
        ),
        notification_type: NotificationType::BankTransfer,
    }];

    Ok(Applied {
        transaction,
        notifications,
        balance,
    })
}

async fn pay_bill<C>(db: &C, session: &Session, bill_id: i64) -> Result<Applied>
where
    C: ConnectionTrait,
{
    let source = Pool::Account(session.account_id);
    let current = ledger::pool_balance(db, source).await?;

    // The bill decides the amount, so it has to be resolved before the funds check.
    let bill = bills::get_bill_for_user(db, &session.user_id, bill_id)
        .await?
        .ok_or_else(|| Error::CounterpartyNotFound {
            counterparty: format!("Bill {bill_id}"),
        })?;
    if bill.paid {
        return Err(Error::BillAlreadyPaid { bill_id });
    }

    let amount = Money::from_minor(bill.amount);
    if current < amount {
        return Err(Error::InsufficientFunds {
            current: current.minor_units(),
            required: amount.minor_units(),
        });
    }

    let balance = ledger::debit(db, source, amount).await?;
    bills::mark_paid(db, bill.id).await?;

    let transaction = recorder::record(
        db,
        NewTransaction {
            counterparty: Some(bill.bill_type.clone()),
            bill_id: Some(bill.id),
            ..NewTransaction::new(session.account_id, amount, TransactionType::BillPayment)
        },
    )
    .await?;

    let notifications = vec![NewNotification {
        user_id: session.user_id.clone(),
        title: "Bill Paid".to_string(),
        message: format!(
            "Your {} bill of {} due {} has been paid.",
            bill.bill_type,
            amount.display_with_symbol(),
            bill.due_date
        ),
        notification_type: NotificationType::BillPayment,
    }];

    Ok(Applied {
        transaction,
        notifications,
        balance,
    })
}

async fn cash_in<C>(
    db: &C,
    session: &Session,
    bank: &BankCounterparty,
    amount: Money,
) -> Result<Applied>
where
    C: ConnectionTrait,
{
    let destination = Pool::Account(session.account_id);
    ledger::pool_balance(db, destination).await?;

    let link = resolver::find_bank_link(db, session.account_id, bank)
        .await?
        .ok_or_else(|| Error::CounterpartyNotFound {
            counterparty: format!(
                "{} account ending in {}",
                bank.bank_name(),
                last_four(bank.account_number())
            ),
        })?;
    let source = Pool::BankLink(link.id);
    ensure_covered(db, source, amount).await?;

    let linked_balance = ledger::debit(db, source, amount).await?;
    let balance = ledger::credit(db, destination, amount).await?;

    let transaction = recorder::record(
        db,
        NewTransaction {
            to_account_id: Some(session.account_id),
            counterparty: Some(bank.bank_name().to_string()),
            bank_name: Some(bank.bank_name().to_string()),
            bank_account_number: Some(bank.account_number().to_string()),
            ..NewTransaction::new(session.account_id, amount, TransactionType::CashIn)
        },
    )
    .await?;

    let notifications = vec![NewNotification {
        user_id: session.user_id.clone(),
        title: "Cash In Successful".to_string(),
        message: format!(
            "You have successfully cashed in {} from {}. Your updated balance in {} is {}.",
            amount.display_with_symbol(),
            bank.bank_name(),
            bank.bank_name(),
            linked_balance.display_with_symbol()
        ),
        notification_type: NotificationType::CashIn,
    }];

    Ok(Applied {
        transaction,
        notifications,
        balance,
    })
}

async fn savings_transfer<C>(
    db: &C,
    session: &Session,
    direction: SavingsDirection,
    amount: Money,
) -> Result<Applied>
where
    C: ConnectionTrait,
{
    let account = Pool::Account(session.account_id);
    let savings = Pool::Savings(session.account_id);

    let (transaction_type, notification) = match direction {
        SavingsDirection::Deposit => {
            ensure_covered(db, account, amount).await?;
            ledger::pool_balance(db, savings).await?;
            ledger::debit(db, account, amount).await?;
            ledger::credit(db, savings, amount).await?;
            (
                TransactionType::AddToSavings,
                NewNotification {
                    user_id: session.user_id.clone(),
                    title: "Added to Savings".to_string(),
                    message: format!(
                        "You added {} to your savings account.",
                        amount.display_with_symbol()
                    ),
                    notification_type: NotificationType::AddToSavings,
                },
            )
        }
        SavingsDirection::Withdraw => {
            ledger::pool_balance(db, account).await?;
            ensure_covered(db, savings, amount).await?;
            ledger::debit(db, savings, amount).await?;
            ledger::credit(db, account, amount).await?;
            (
                TransactionType::CashIn,
                NewNotification {
                    user_id: session.user_id.clone(),
                    title: "Cash In Successful".to_string(),
                    message: format!(
                        "You cashed in {} from your savings account.",
                        amount.display_with_symbol()
                    ),
                    notification_type: NotificationType::CashIn,
                },
            )
        }
    };

    let transaction = recorder::record(
        db,
        NewTransaction {
            to_account_id: Some(session.account_id),
            counterparty: Some("savings".to_string()),
            ..NewTransaction::new(session.account_id, amount, transaction_type)
        },
    )
    .await?;
    let balance = ledger::pool_balance(db, account).await?;

    Ok(Applied {
        transaction,
        notifications: vec![notification],
        balance,
    })
}

/// The username of `user_id`, or the id itself if the profile is missing.
async fn display_name<C>(db: &C, user_id: &str) -> Result<String>
where
    C: ConnectionTrait,
{
    Ok(User::find_by_id(user_id)
        .one(db)
        .await?
        .map_or_else(|| user_id.to_string(), |user| user.username))
}

fn last_four(account_number: &str) -> &str {
    account_number
        .get(account_number.len().saturating_sub(4)..)
        .unwrap_or(account_number)
}
