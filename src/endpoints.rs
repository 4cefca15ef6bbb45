//! The API endpoints URIs.

/// The route an external cron service calls to generate due recurring transactions.
///
/// Accepts both GET and POST.
pub const GENERATE_RECURRING: &str = "/api/cron/generate-recurring";
