//! Budgeteur Recurring generates ledger transactions from recurring transaction templates.
//!
//! An external cron service calls [endpoints::GENERATE_RECURRING] once a day. Each call runs one
//! generation cycle: every active, auto-creating template whose next occurrence is on or before
//! today produces one ledger transaction dated today, and its schedule is advanced. Templates
//! whose end date has passed are deactivated instead.
//!
//! The generator itself is [run_generation_cycle], which works against the
//! [RecurringTemplateStore] and [TransactionStore] traits so it can be driven from the HTTP
//! endpoint, the `generate_recurring` binary or tests with in-memory stores.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod auth;
mod database_id;
mod date_format;
mod db;
pub mod endpoints;
mod ledger;
mod logging;
mod recurring;
mod routing;
pub mod stores;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use database_id::{AccountId, DatabaseId, TemplateId, TransactionId, UserId};
pub use date_format::{format_date, parse_date};
pub use db::initialize as initialize_db;
pub use ledger::{LedgerTransaction, NewLedgerTransaction, TransactionType};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use recurring::{
    FailureStage, Frequency, GenerationResponse, ItemFailure, ItemOutcome, NewRecurringTemplate,
    RecurringTemplate, RunReport, TemplatePatch, next_occurrence, run_generation_cycle,
};
pub use routing::build_router;
pub use stores::{RecurringTemplateStore, TemplateQuery, TransactionStore};
pub use timezone::{date_in_timezone, get_local_offset, today};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The bearer token was missing, malformed or did not match the cron secret.
    #[error("unauthorized")]
    Unauthorized,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// A date string was not in the `yyyy-MM-dd` format.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not parse date \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// A request or response body could not be read while logging it.
    #[error("could not read the HTTP body: {0}")]
    BodyReadError(String),

    /// Tried to update a recurring template that does not exist
    #[error("tried to update a recurring template that is not in the database")]
    UpdateMissingTemplate,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to the client when a request fails as a whole.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::InvalidDateFormat(_, _) => StatusCode::BAD_REQUEST,
            ref error => {
                tracing::error!("An unexpected error occurred: {}", error);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let error = match self {
            Error::Unauthorized => "Unauthorized".to_owned(),
            error => error.to_string(),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}
