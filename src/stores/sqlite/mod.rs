//! Contains the SQLite backed implementations of the store traits.

mod template;
mod transaction;

pub use template::SQLiteTemplateStore;
pub use transaction::SQLiteTransactionStore;
