//! Shared test utilities for `PocketBank`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating customers, bank links and bills with sensible defaults.

use crate::{
    core::{
        bills,
        money::Money,
        onboarding::{self, NewCustomer},
        resolver::BankCounterparty,
        recorder::NotificationType,
        session::Session,
    },
    entities::{bank_link, bill},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ConnectOptions, ConnectionTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
///
/// The pool is pinned to one connection so every query sees the same in-memory database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Opens a customer and returns a session for them.
///
/// # Defaults
/// * `user_id`: `"user-{username}"`
/// * `email`: `"{username}@example.com"`
pub async fn create_test_customer(
    db: &DatabaseConnection,
    username: &str,
    initial_balance: &str,
) -> Result<Session> {
    let opened = onboarding::open_customer(
        db,
        NewCustomer {
            user_id: format!("user-{username}"),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            initial_balance: Money::parse_non_negative(initial_balance)?,
        },
    )
    .await?;
    Ok(opened.session())
}

/// Links an external bank account to `account_id` with a starting balance.
pub async fn create_test_bank_link(
    db: &DatabaseConnection,
    account_id: i64,
    bank: &BankCounterparty,
    balance: &str,
) -> Result<bank_link::Model> {
    let now = chrono::Utc::now();
    let link = bank_link::ActiveModel {
        account_id: Set(account_id),
        bank_name: Set(bank.bank_name().to_string()),
        bank_account_number: Set(bank.account_number().to_string()),
        balance: Set(Money::parse_non_negative(balance)?.minor_units()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(link)
}

/// Creates an unpaid bill due on 2026-11-30.
pub async fn create_test_bill(
    db: &DatabaseConnection,
    user_id: &str,
    bill_type: &str,
    amount: &str,
) -> Result<bill::Model> {
    let due_date = NaiveDate::from_ymd_opt(2026, 11, 30).unwrap_or_default();
    bills::create_bill(db, user_id, bill_type, Money::parse(amount)?, due_date).await
}

/// Makes every insert into `notifications` fail, to exercise write-failure paths.
pub async fn reject_notification_inserts(db: &DatabaseConnection) -> Result<()> {
    db.execute_unprepared(
        "CREATE TRIGGER reject_notifications BEFORE INSERT ON notifications \
         BEGIN SELECT RAISE(ABORT, 'notifications are unavailable'); END;",
    )
    .await?;
    Ok(())
}

/// Makes inserts of one notification type fail, leaving the others writable.
pub async fn reject_notifications_of_type(
    db: &DatabaseConnection,
    notification_type: NotificationType,
) -> Result<()> {
    let kind = notification_type.as_str();
    db.execute_unprepared(&format!(
        "CREATE TRIGGER reject_{kind}_notifications BEFORE INSERT ON notifications \
         WHEN NEW.notification_type = '{kind}' \
         BEGIN SELECT RAISE(ABORT, '{kind} notifications are unavailable'); END;"
    ))
    .await?;
    Ok(())
}
