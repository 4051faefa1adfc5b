//! Bill business logic.
//!
//! Bills are created by an outside process (the start-up seeder stands in for it) and
//! settled only by the bill-payment movement through [`mark_paid`].

use crate::{
    config::BillSeed,
    core::money::Money,
    entities::{Bill, User, bill},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Set, prelude::*, sea_query::Expr};
use tracing::{info, instrument, warn};

/// Creates an unpaid bill.
///
/// # Errors
/// Returns [`Error::Validation`] if the bill type is blank or the amount is not positive.
pub async fn create_bill<C>(
    db: &C,
    user_id: &str,
    bill_type: &str,
    amount: Money,
    due_date: NaiveDate,
) -> Result<bill::Model>
where
    C: ConnectionTrait,
{
    let bill_type = bill_type.trim();
    if bill_type.is_empty() {
        return Err(Error::validation("Bill type cannot be empty."));
    }
    if !amount.is_positive() {
        return Err(Error::validation("Bill amount must be greater than zero."));
    }

    let model = bill::ActiveModel {
        user_id: Set(user_id.to_string()),
        bill_type: Set(bill_type.to_string()),
        amount: Set(amount.minor_units()),
        due_date: Set(due_date),
        paid: Set(false),
        paid_at: Set(None),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Finds a bill owned by `user_id`.
///
/// A bill that exists but belongs to someone else is reported as absent.
pub async fn get_bill_for_user<C>(db: &C, user_id: &str, bill_id: i64) -> Result<Option<bill::Model>>
where
    C: ConnectionTrait,
{
    Bill::find_by_id(bill_id)
        .filter(bill::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Flips a bill from unpaid to paid, stamping the payment time.
///
/// The update only matches an unpaid row, so two payments racing on the same bill
/// cannot both succeed.
///
/// # Errors
/// Returns [`Error::BillAlreadyPaid`] if the bill was not unpaid.
pub async fn mark_paid<C>(db: &C, bill_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Bill::update_many()
        .col_expr(bill::Column::Paid, Expr::value(true))
        .col_expr(bill::Column::PaidAt, Expr::value(Some(chrono::Utc::now())))
        .filter(bill::Column::Id.eq(bill_id))
        .filter(bill::Column::Paid.eq(false))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::BillAlreadyPaid { bill_id });
    }
    Ok(())
}

/// Creates the configured bills that are not in the database yet.
///
/// A bill counts as present when a row with the same owner, type, amount and due date
/// exists. Seeds for unknown users or with unparsable amounts are skipped with a warning.
/// Returns the number of bills created.
#[instrument(skip(db, seeds), fields(seed_count = seeds.len()))]
pub async fn seed_bills(db: &DatabaseConnection, seeds: &[BillSeed]) -> Result<usize> {
    let mut created = 0;

    for seed in seeds {
        let amount = match Money::parse(&seed.amount) {
            Ok(amount) => amount,
            Err(e) => {
                warn!("Skipping {} bill for {}: {e}", seed.bill_type, seed.user_id);
                continue;
            }
        };

        if User::find_by_id(seed.user_id.as_str()).one(db).await?.is_none() {
            warn!("Skipping {} bill: user {} does not exist", seed.bill_type, seed.user_id);
            continue;
        }

        let existing = Bill::find()
            .filter(bill::Column::UserId.eq(seed.user_id.as_str()))
            .filter(bill::Column::BillType.eq(seed.bill_type.trim()))
            .filter(bill::Column::Amount.eq(amount.minor_units()))
            .filter(bill::Column::DueDate.eq(seed.due_date))
            .one(db)
            .await?;
        if existing.is_some() {
            continue;
        }

        create_bill(db, &seed.user_id, &seed.bill_type, amount, seed.due_date).await?;
        created += 1;
    }

    info!("Seeded {created} new bill(s).");
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn due(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, day).unwrap()
    }

    #[tokio::test]
    async fn test_create_bill_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_bill(&db, "user-juan", "  ", Money::from_major(10), due(1)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_bill(&db, "user-juan", "Water", Money::ZERO, due(1)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_bill_for_user_checks_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let juan = create_test_customer(&db, "juan", "0.00").await?;
        let maria = create_test_customer(&db, "maria", "0.00").await?;
        let bill = create_test_bill(&db, &juan.user_id, "Electricity", "500.00").await?;

        assert_eq!(get_bill_for_user(&db, &juan.user_id, bill.id).await?, Some(bill.clone()));
        assert!(get_bill_for_user(&db, &maria.user_id, bill.id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_paid_only_once() -> Result<()> {
        let db = setup_test_db().await?;
        let juan = create_test_customer(&db, "juan", "0.00").await?;
        let bill = create_test_bill(&db, &juan.user_id, "Water", "120.50").await?;
        assert!(!bill.paid);

        mark_paid(&db, bill.id).await?;
        let paid = Bill::find_by_id(bill.id).one(&db).await?.unwrap();
        assert!(paid.paid);
        assert!(paid.paid_at.is_some());

        let again = mark_paid(&db, bill.id).await;
        assert!(matches!(again, Err(Error::BillAlreadyPaid { bill_id }) if bill_id == bill.id));

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_bills_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let juan = create_test_customer(&db, "juan", "0.00").await?;

        let seeds = vec![
            BillSeed {
                user_id: juan.user_id.clone(),
                bill_type: "Electricity".to_string(),
                amount: "500.00".to_string(),
                due_date: due(1),
            },
            BillSeed {
                user_id: "nobody".to_string(),
                bill_type: "Water".to_string(),
                amount: "100.00".to_string(),
                due_date: due(2),
            },
            BillSeed {
                user_id: juan.user_id.clone(),
                bill_type: "Internet".to_string(),
                amount: "lots".to_string(),
                due_date: due(3),
            },
        ];

        assert_eq!(seed_bills(&db, &seeds).await?, 1);
        assert_eq!(seed_bills(&db, &seeds).await?, 0);
        assert_eq!(Bill::find().all(&db).await?.len(), 1);

        Ok(())
    }
}
