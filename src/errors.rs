//! Unified error type for `PocketBank`.
//!
//! Every failure a money movement can hit is a variant here. Workflows abort on the
//! first error they see and never retry; [`Error::category`] maps a variant onto the
//! small taxonomy callers branch on, and [`Error::user_message`] is what gets shown
//! to the customer.

use thiserror::Error;

/// Coarse classification of an [`Error`], as surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or missing input.
    Validation,
    /// The acting account does not exist.
    AccountNotFound,
    /// The recipient, bank link, or bill could not be resolved.
    CounterpartyNotFound,
    /// The source balance is lower than the requested amount.
    InsufficientFunds,
    /// The store rejected a write.
    WriteFailed,
    /// Anything else (connectivity, configuration, ...).
    Unexpected,
}

/// Errors produced by `PocketBank` operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Account not found: {account}")]
    AccountNotFound { account: String },

    #[error("Counterparty not found: {counterparty}")]
    CounterpartyNotFound { counterparty: String },

    #[error("Insufficient funds: balance {current}, requested {required}")]
    InsufficientFunds { current: i64, required: i64 },

    #[error("Bill {bill_id} has already been paid")]
    BillAlreadyPaid { bill_id: i64 },

    #[error("Write failed: {message}")]
    WriteFailed { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Classifies the error into the taxonomy callers act on.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::BillAlreadyPaid { .. } => ErrorCategory::Validation,
            Self::AccountNotFound { .. } => ErrorCategory::AccountNotFound,
            Self::CounterpartyNotFound { .. } => ErrorCategory::CounterpartyNotFound,
            Self::InsufficientFunds { .. } => ErrorCategory::InsufficientFunds,
            Self::WriteFailed { .. } => ErrorCategory::WriteFailed,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => ErrorCategory::Unexpected,
        }
    }

    /// Human-readable text suitable for showing to the end user.
    ///
    /// Storage details are never leaked; they stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } => message.clone(),
            Self::AccountNotFound { .. } => "Could not retrieve your account.".to_string(),
            Self::CounterpartyNotFound { counterparty } => {
                format!("{counterparty} could not be found.")
            }
            Self::InsufficientFunds { .. } => {
                "Not enough balance to complete this transaction.".to_string()
            }
            Self::BillAlreadyPaid { .. } => "This bill has already been paid.".to_string(),
            Self::WriteFailed { .. } => {
                "The transaction could not be saved. No money was moved.".to_string()
            }
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
