//! Ledger transactions: the concrete income and expense records the generator creates.

mod core;

pub use core::{
    LEDGER_COLUMNS, LedgerTransaction, NewLedgerTransaction, TransactionType,
    create_ledger_transaction_table, map_row_to_ledger_transaction,
};
