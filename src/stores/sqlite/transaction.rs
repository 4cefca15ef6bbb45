//! Implements a SQLite backed ledger transaction store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, params};

use crate::{
    Error,
    ledger::{
        LEDGER_COLUMNS, LedgerTransaction, NewLedgerTransaction, map_row_to_ledger_transaction,
    },
    stores::TransactionStore,
};

/// Stores ledger transactions in a SQLite database.
///
/// The table must have been created with [crate::initialize_db].
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DatabaseLockError] if the database lock is poisoned,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, transaction: NewLedgerTransaction) -> Result<LedgerTransaction, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        connection.execute(
            "INSERT INTO \"transaction\" (user_id, account_id, date, amount, type, category,
                subcategory, description, merchant, is_recurring, is_internal_transfer)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                transaction.user_id,
                transaction.account_id,
                transaction.date,
                transaction.amount,
                transaction.transaction_type,
                transaction.category,
                transaction.subcategory,
                transaction.description,
                transaction.merchant,
                transaction.is_recurring,
                transaction.is_internal_transfer,
            ],
        )?;

        let id = connection.last_insert_rowid();

        Ok(transaction.with_id(id))
    }

    /// Retrieve all transactions in the database ordered by ID.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DatabaseLockError] if the database lock is poisoned,
    /// - or [Error::SqlError] there is a SQL error.
    fn get_all(&self) -> Result<Vec<LedgerTransaction>, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?
            .prepare(&format!(
                "SELECT {LEDGER_COLUMNS} FROM \"transaction\" ORDER BY id ASC"
            ))?
            .query_map([], map_row_to_ledger_transaction)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }
}
