//! Defines the ledger transaction store trait.

use crate::{
    Error,
    ledger::{LedgerTransaction, NewLedgerTransaction},
};

/// Handles the creation and retrieval of ledger transactions.
pub trait TransactionStore {
    /// Create a new transaction in the store.
    fn create(&mut self, transaction: NewLedgerTransaction) -> Result<LedgerTransaction, Error>;

    /// Retrieve all transactions in the order they were created.
    fn get_all(&self) -> Result<Vec<LedgerTransaction>, Error>;
}
