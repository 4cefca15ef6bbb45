//! Defines the core data models and table schema for ledger transactions.

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::Serialize;
use time::Date;

use crate::{
    database_id::{AccountId, TransactionId, UserId},
    recurring::RecurringTemplate,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g. wages.
    Income,
    /// Money going out, e.g. rent.
    Expense,
}

impl TransactionType {
    /// The text used to store the type in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(FromSqlError::Other(
                format!("\"{other}\" is not a valid transaction type").into(),
            )),
        }
    }
}

/// A concrete income or expense recorded in the ledger.
///
/// Account balances are derived from these rows by the database, not by this app.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerTransaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserId,
    /// The account the transaction is booked against.
    pub account_id: AccountId,
    /// When the transaction happened.
    pub date: Date,
    /// The amount of money spent or earned, never negative.
    pub amount: f64,
    /// Whether this is income or an expense.
    pub transaction_type: TransactionType,
    /// The category, e.g. "Housing".
    pub category: String,
    /// An optional finer grained category, e.g. "Mortgage".
    pub subcategory: Option<String>,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Who was paid or who paid.
    pub merchant: Option<String>,
    /// Whether the transaction was generated from a recurring template.
    pub is_recurring: bool,
    /// Whether the transaction moves money between the user's own accounts.
    pub is_internal_transfer: bool,
}

/// The fields needed to insert a [LedgerTransaction].
///
/// See [LedgerTransaction] for what each field means.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct NewLedgerTransaction {
    pub user_id: UserId,
    pub account_id: AccountId,
    pub date: Date,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub category: String,
    pub subcategory: Option<String>,
    pub description: String,
    pub merchant: Option<String>,
    pub is_recurring: bool,
    pub is_internal_transfer: bool,
}

impl NewLedgerTransaction {
    /// Materialize one occurrence of `template`, dated `date`.
    ///
    /// The transaction is marked as recurring and never as an internal transfer.
    pub fn from_template(template: &RecurringTemplate, date: Date) -> Self {
        Self {
            user_id: template.user_id,
            account_id: template.account_id,
            date,
            amount: template.amount,
            transaction_type: template.transaction_type,
            category: template.category.clone(),
            subcategory: template.subcategory.clone(),
            description: template.description.clone(),
            merchant: template.merchant.clone(),
            is_recurring: true,
            is_internal_transfer: false,
        }
    }

    /// Attach the database `id` to create the stored [LedgerTransaction].
    pub fn with_id(self, id: TransactionId) -> LedgerTransaction {
        LedgerTransaction {
            id,
            user_id: self.user_id,
            account_id: self.account_id,
            date: self.date,
            amount: self.amount,
            transaction_type: self.transaction_type,
            category: self.category,
            subcategory: self.subcategory,
            description: self.description,
            merchant: self.merchant,
            is_recurring: self.is_recurring,
            is_internal_transfer: self.is_internal_transfer,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns of the ledger table in the order [map_row_to_ledger_transaction] expects.
pub const LEDGER_COLUMNS: &str = "id, user_id, account_id, date, amount, type, category, \
    subcategory, description, merchant, is_recurring, is_internal_transfer";

/// Create the ledger transaction table.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_ledger_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            account_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            category TEXT NOT NULL,
            subcategory TEXT,
            description TEXT NOT NULL,
            merchant TEXT,
            is_recurring INTEGER NOT NULL DEFAULT 0,
            is_internal_transfer INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date)",
        (),
    )?;

    Ok(())
}

/// Map a row selected with [LEDGER_COLUMNS] to a [LedgerTransaction].
pub fn map_row_to_ledger_transaction(row: &Row) -> Result<LedgerTransaction, rusqlite::Error> {
    Ok(LedgerTransaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        account_id: row.get(2)?,
        date: row.get(3)?,
        amount: row.get(4)?,
        transaction_type: row.get(5)?,
        category: row.get(6)?,
        subcategory: row.get(7)?,
        description: row.get(8)?,
        merchant: row.get(9)?,
        is_recurring: row.get(10)?,
        is_internal_transfer: row.get(11)?,
    })
}
