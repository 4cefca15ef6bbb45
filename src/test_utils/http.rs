use axum::{body::Body, http::Response};
use rusqlite::Connection;

use crate::AppState;

/// The cron secret used by [get_test_state].
pub(crate) const TEST_CRON_SECRET: &str = "let-me-in";

/// An [AppState] backed by a fresh in-memory database.
pub(crate) fn get_test_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, TEST_CRON_SECRET, "Etc/UTC")
        .expect("Could not create the test app state")
}

/// Read the whole response body as JSON.
pub(crate) async fn response_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    serde_json::from_slice(&body).expect("Response body is not valid JSON")
}

/// Lock the state's database connection.
pub(crate) fn lock(state: &AppState) -> std::sync::MutexGuard<'_, Connection> {
    state
        .db_connection
        .lock()
        .expect("Could not acquire database lock")
}
