//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a recurring transaction template.
pub type TemplateId = DatabaseId;
/// The ID of a ledger transaction.
pub type TransactionId = DatabaseId;
/// The ID of the user that owns a template or transaction.
pub type UserId = DatabaseId;
/// The ID of the account a transaction is booked against.
pub type AccountId = DatabaseId;
