//! Bearer token authentication for the routes the cron service calls.

mod middleware;

pub use middleware::{CronAuthState, cron_auth_guard, hash_secret};
