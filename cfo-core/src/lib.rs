//! cfo-core: record types and local JSON storage for mini-cfo

pub mod finance;
pub mod store;

pub use finance::{Category, Expense, Reminder};
pub use store::{Corrections, Store, check_amount};
