//! Transaction and notification recorder.
//!
//! Appends the audit trail of a completed movement: exactly one transaction row, plus
//! one notification per party told about it. Rows are only ever inserted here.

use crate::{
    core::money::Money,
    entities::{notification, transaction},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::debug;

/// What kind of movement a transaction row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Account to another customer's account
    SendMoney,
    /// Account to a linked external bank account
    BankTransfer,
    /// Account to a bill
    BillPayment,
    /// Into the account, from a bank link or from savings
    CashIn,
    /// Account to its savings pool
    AddToSavings,
}

impl TransactionType {
    /// The tag stored in `transactions.transaction_type`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SendMoney => "send_money",
            Self::BankTransfer => "bank_transfer",
            Self::BillPayment => "bill_payment",
            Self::CashIn => "cash_in",
            Self::AddToSavings => "add_to_savings",
        }
    }
}

/// What kind of event a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationType {
    /// Sender side of a user-to-user send
    SendMoney,
    /// Recipient side of a user-to-user send
    ReceiveMoney,
    /// Transfer out to a bank
    BankTransfer,
    /// Bill settled
    BillPayment,
    /// Money brought into the account
    CashIn,
    /// Money set aside into savings
    AddToSavings,
}

impl NotificationType {
    /// Every notification type, in a stable order.
    pub const ALL: [Self; 6] = [
        Self::SendMoney,
        Self::ReceiveMoney,
        Self::BankTransfer,
        Self::BillPayment,
        Self::CashIn,
        Self::AddToSavings,
    ];

    /// Types shown on the movement-history screen.
    pub const MOVEMENT_HISTORY: [Self; 3] =
        [Self::SendMoney, Self::ReceiveMoney, Self::BankTransfer];

    /// The tag stored in `notifications.notification_type`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SendMoney => "send_money",
            Self::ReceiveMoney => "receive_money",
            Self::BankTransfer => "bank_transfer",
            Self::BillPayment => "bill_payment",
            Self::CashIn => "cash_in",
            Self::AddToSavings => "add_to_savings",
        }
    }
}

/// A transaction row about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Account the money came from (for cash-ins, the account it went to)
    pub from_account_id: i64,
    /// Destination account, if any
    pub to_account_id: Option<i64>,
    /// Human-readable destination
    pub counterparty: Option<String>,
    /// Amount moved
    pub amount: Money,
    /// Movement kind
    pub transaction_type: TransactionType,
    /// External bank name, for bank movements
    pub bank_name: Option<String>,
    /// External account number, for bank movements
    pub bank_account_number: Option<String>,
    /// Settled bill, for bill payments
    pub bill_id: Option<i64>,
}

impl NewTransaction {
    /// A transaction with only the mandatory fields set.
    #[must_use]
    pub const fn new(from_account_id: i64, amount: Money, transaction_type: TransactionType) -> Self {
        Self {
            from_account_id,
            to_account_id: None,
            counterparty: None,
            amount,
            transaction_type,
            bank_name: None,
            bank_account_number: None,
            bill_id: None,
        }
    }
}

/// A notification about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// Recipient of the notification
    pub user_id: String,
    /// Short headline
    pub title: String,
    /// Full message text
    pub message: String,
    /// Event kind
    pub notification_type: NotificationType,
}

/// Appends one transaction row.
///
/// # Errors
/// Returns [`Error::WriteFailed`] if the store rejects the insert.
pub async fn record<C>(db: &C, new: NewTransaction) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    let model = transaction::ActiveModel {
        from_account_id: Set(new.from_account_id),
        to_account_id: Set(new.to_account_id),
        counterparty: Set(new.counterparty),
        amount: Set(new.amount.minor_units()),
        transaction_type: Set(new.transaction_type.as_str().to_string()),
        bank_name: Set(new.bank_name),
        bank_account_number: Set(new.bank_account_number),
        bill_id: Set(new.bill_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let saved = model.insert(db).await.map_err(|e| Error::WriteFailed {
        message: format!("recording {} transaction: {e}", new.transaction_type.as_str()),
    })?;
    debug!("Recorded transaction {} ({})", saved.id, saved.transaction_type);
    Ok(saved)
}

/// Appends one unread notification.
///
/// # Errors
/// Returns [`Error::WriteFailed`] if the store rejects the insert.
pub async fn notify<C>(db: &C, new: NewNotification) -> Result<notification::Model>
where
    C: ConnectionTrait,
{
    let kind = new.notification_type.as_str();
    let model = notification::ActiveModel {
        user_id: Set(new.user_id),
        title: Set(new.title),
        message: Set(new.message),
        notification_type: Set(kind.to_string()),
        created_at: Set(chrono::Utc::now()),
        is_read: Set(false),
        ..Default::default()
    };

    model.insert(db).await.map_err(|e| Error::WriteFailed {
        message: format!("recording {kind} notification: {e}"),
    })
}

/// Appends several notifications in order, stopping at the first failure.
pub async fn notify_all<C>(
    db: &C,
    notifications: Vec<NewNotification>,
) -> Result<Vec<notification::Model>>
where
    C: ConnectionTrait,
{
    let mut saved = Vec::with_capacity(notifications.len());
    for new in notifications {
        saved.push(notify(db, new).await?);
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{Notification, Transaction};
    use crate::test_utils::*;

    #[test]
    fn test_type_tags_are_distinct() {
        let mut tags: Vec<&str> = NotificationType::ALL.iter().map(|t| t.as_str()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), NotificationType::ALL.len());
        assert_eq!(TransactionType::BillPayment.as_str(), "bill_payment");
    }

    #[tokio::test]
    async fn test_record_transaction() -> Result<()> {
        let db = setup_test_db().await?;
        let juan = create_test_customer(&db, "juan", "0.00").await?;

        let before = chrono::Utc::now();
        let saved = record(
            &db,
            NewTransaction {
                counterparty: Some("BDO".to_string()),
                bank_name: Some("BDO".to_string()),
                bank_account_number: Some("1234567890".to_string()),
                ..NewTransaction::new(
                    juan.account_id,
                    Money::from_major(100),
                    TransactionType::BankTransfer,
                )
            },
        )
        .await?;

        assert_eq!(saved.from_account_id, juan.account_id);
        assert_eq!(saved.amount, 10_000);
        assert_eq!(saved.transaction_type, "bank_transfer");
        assert!(saved.created_at >= before);

        let stored = Transaction::find_by_id(saved.id).one(&db).await?.unwrap();
        assert_eq!(stored, saved);

        Ok(())
    }

    #[tokio::test]
    async fn test_notify_all_creates_unread_rows() -> Result<()> {
        let db = setup_test_db().await?;
        let juan = create_test_customer(&db, "juan", "0.00").await?;
        let maria = create_test_customer(&db, "maria", "0.00").await?;

        let saved = notify_all(
            &db,
            vec![
                NewNotification {
                    user_id: juan.user_id.clone(),
                    title: "Money Sent".to_string(),
                    message: "You sent ₱1.00 to maria.".to_string(),
                    notification_type: NotificationType::SendMoney,
                },
                NewNotification {
                    user_id: maria.user_id.clone(),
                    title: "Money Received".to_string(),
                    message: "You received ₱1.00 from juan.".to_string(),
                    notification_type: NotificationType::ReceiveMoney,
                },
            ],
        )
        .await?;

        assert_eq!(saved.len(), 2);
        assert!(saved.iter().all(|n| !n.is_read));
        assert_eq!(saved[1].user_id, maria.user_id);
        assert_eq!(saved[1].notification_type, "receive_money");
        assert_eq!(Notification::find().all(&db).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_insert_is_write_failure() -> Result<()> {
        let db = setup_test_db().await?;
        let juan = create_test_customer(&db, "juan", "0.00").await?;
        reject_notification_inserts(&db).await?;

        let result = notify(
            &db,
            NewNotification {
                user_id: juan.user_id,
                title: "Cash In".to_string(),
                message: "You cashed in ₱5.00.".to_string(),
                notification_type: NotificationType::CashIn,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::WriteFailed { .. })));

        Ok(())
    }
}
