//! Core business logic, independent of any front end.
//!
//! Every operation takes a database connection and, where it acts for a customer, an
//! explicit [`session::Session`]. Money only moves through [`movement::execute`].

pub mod bills;
pub mod history;
pub mod ledger;
pub mod money;
pub mod movement;
pub mod onboarding;
pub mod recorder;
pub mod resolver;
pub mod session;

pub use money::Money;
pub use movement::{Movement, MovementReceipt, NotificationPolicy, SavingsDirection, execute};
pub use session::Session;
