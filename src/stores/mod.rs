//! Contains traits and implementations for objects that store recurring templates and ledger
//! transactions.

mod template;
mod transaction;

pub mod sqlite;

pub use template::{RecurringTemplateStore, TemplateQuery};
pub use transaction::TransactionStore;
