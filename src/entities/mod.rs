//! Entity module - SeaORM definitions for every table the bank reads or writes.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod bank_link;
pub mod bill;
pub mod notification;
pub mod savings;
pub mod transaction;
pub mod user;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use bank_link::{Column as BankLinkColumn, Entity as BankLink, Model as BankLinkModel};
pub use bill::{Column as BillColumn, Entity as Bill, Model as BillModel};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
};
pub use savings::{Column as SavingsColumn, Entity as Savings, Model as SavingsModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
