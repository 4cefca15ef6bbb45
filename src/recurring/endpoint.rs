//! Defines the endpoint the cron service calls to run a generation cycle.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{
    AppState, Error,
    recurring::{RunReport, run_generation_cycle},
    stores::sqlite::{SQLiteTemplateStore, SQLiteTransactionStore},
    timezone::today,
};

/// The state needed to run a generation cycle.
#[derive(Debug, Clone)]
pub struct GenerateState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for templates and the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GenerateState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body returned by [generate_recurring_endpoint].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GenerationResponse {
    /// No template was due.
    NothingDue {
        /// A human readable summary.
        message: String,
        /// Always zero.
        processed: usize,
    },
    /// At least one template was processed.
    Completed {
        /// A human readable summary.
        message: String,
        /// The number of transactions generated.
        success: usize,
        /// The number of templates that failed.
        errors: usize,
        /// The number of expired templates that were deactivated.
        deactivated: usize,
        /// One message per failed template, omitted when nothing failed.
        #[serde(rename = "errorDetails", skip_serializing_if = "Option::is_none")]
        error_details: Option<Vec<String>>,
    },
}

impl From<&RunReport> for GenerationResponse {
    fn from(report: &RunReport) -> Self {
        if report.processed() == 0 {
            return Self::NothingDue {
                message: "No recurring transactions due".to_owned(),
                processed: 0,
            };
        }

        let error_details = report.error_details();

        Self::Completed {
            message: format!(
                "Processed {} recurring transactions",
                report.processed()
            ),
            success: report.succeeded(),
            errors: report.failed(),
            deactivated: report.deactivated(),
            error_details: (!error_details.is_empty()).then_some(error_details),
        }
    }
}

/// A route handler that generates the ledger transactions for every template due today.
///
/// Registered for both GET and POST so the cron service and manual calls behave the same.
/// Authorization is checked by [crate::auth::cron_auth_guard] before this handler runs.
///
/// Responds with 200 and a [GenerationResponse] even when some templates failed, and with 500
/// and an error body if the due templates could not be loaded.
pub async fn generate_recurring_endpoint(State(state): State<GenerateState>) -> Response {
    let today = match today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_response(),
    };

    match generate_for_date(today, &state) {
        Ok(report) => (StatusCode::OK, Json(GenerationResponse::from(&report))).into_response(),
        Err(error) => {
            tracing::error!("Could not run the generation cycle for {today}: {error}");
            error.into_response()
        }
    }
}

/// Run a generation cycle for `today` against the SQLite stores in `state`.
///
/// # Errors
/// Returns an error if the due templates could not be queried.
pub fn generate_for_date(today: Date, state: &GenerateState) -> Result<RunReport, Error> {
    let mut templates = SQLiteTemplateStore::new(state.db_connection.clone());
    let mut ledger = SQLiteTransactionStore::new(state.db_connection.clone());

    run_generation_cycle(today, &mut templates, &mut ledger)
}


#[cfg(test)]
mod endpoint_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use time::Duration;

    use crate::{
        AppState, build_router, endpoints,
        ledger::TransactionType,
        recurring::{Frequency, NewRecurringTemplate},
        stores::{
            RecurringTemplateStore, TransactionStore,
            sqlite::{SQLiteTemplateStore, SQLiteTransactionStore},
        },
        test_utils::{get_test_state, http::TEST_CRON_SECRET, http::lock},
        timezone::today,
    };

    fn get_test_server(state: &AppState) -> TestServer {
        TestServer::new(build_router(state.clone())).expect("Could not create test server.")
    }

    fn stores(state: &AppState) -> (SQLiteTemplateStore, SQLiteTransactionStore) {
        (
            SQLiteTemplateStore::new(state.db_connection.clone()),
            SQLiteTransactionStore::new(state.db_connection.clone()),
        )
    }

    fn new_template(description: &str, next_occurrence: time::Date) -> NewRecurringTemplate {
        NewRecurringTemplate::build(
            description,
            1500.0,
            TransactionType::Expense,
            Frequency::Monthly,
            next_occurrence,
        )
    }

    #[tokio::test]
    async fn nothing_due_returns_processed_zero() {
        let state = get_test_state();
        let server = get_test_server(&state);

        let response = server
            .post(endpoints::GENERATE_RECURRING)
            .authorization_bearer(TEST_CRON_SECRET)
            .await;

        response.assert_status_ok();
        response.assert_json(&serde_json::json!({
            "message": "No recurring transactions due",
            "processed": 0
        }));
    }

    #[tokio::test]
    async fn due_template_is_generated_and_advanced() {
        let state = get_test_state();
        let today = today(&state.local_timezone).unwrap();
        let (mut templates, ledger) = stores(&state);
        let mortgage = templates
            .create(new_template("KPR instalment", today))
            .unwrap();
        let server = get_test_server(&state);

        let response = server
            .post(endpoints::GENERATE_RECURRING)
            .authorization_bearer(TEST_CRON_SECRET)
            .await;

        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["success"], 1);
        assert_eq!(body["errors"], 0);
        assert!(body.get("errorDetails").is_none());

        let transactions = ledger.get_all().unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].date, today);
        assert_eq!(transactions[0].amount, 1500.0);
        assert!(transactions[0].is_recurring);

        let updated = templates.get(mortgage.id).unwrap();
        assert!(updated.next_occurrence > today);
        assert_eq!(updated.last_generated, Some(today));
    }

    #[tokio::test]
    async fn get_and_post_behave_the_same() {
        let state = get_test_state();
        let today = today(&state.local_timezone).unwrap();
        let (mut templates, ledger) = stores(&state);
        templates
            .create(new_template("Phone", today - Duration::days(1)))
            .unwrap();
        let server = get_test_server(&state);

        let response = server
            .get(endpoints::GENERATE_RECURRING)
            .authorization_bearer(TEST_CRON_SECRET)
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<serde_json::Value>()["success"], 1);
        assert_eq!(ledger.get_all().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_call_on_same_day_generates_nothing() {
        let state = get_test_state();
        let today = today(&state.local_timezone).unwrap();
        let (mut templates, ledger) = stores(&state);
        templates.create(new_template("Rent", today)).unwrap();
        let server = get_test_server(&state);

        for _ in 0..2 {
            server
                .post(endpoints::GENERATE_RECURRING)
                .authorization_bearer(TEST_CRON_SECRET)
                .await
                .assert_status_ok();
        }

        assert_eq!(ledger.get_all().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn expired_template_is_deactivated() {
        let state = get_test_state();
        let today = today(&state.local_timezone).unwrap();
        let (mut templates, ledger) = stores(&state);
        let mut expired = new_template("Old gym", today - Duration::days(3));
        expired.end_date = Some(today - Duration::days(1));
        let expired = templates.create(expired).unwrap();
        let server = get_test_server(&state);

        let response = server
            .post(endpoints::GENERATE_RECURRING)
            .authorization_bearer(TEST_CRON_SECRET)
            .await;

        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["success"], 0);
        assert_eq!(body["deactivated"], 1);
        assert!(ledger.get_all().unwrap().is_empty());
        assert!(!templates.get(expired.id).unwrap().is_active);
    }

    #[tokio::test]
    async fn unauthorized_call_touches_nothing() {
        let state = get_test_state();
        let today = today(&state.local_timezone).unwrap();
        let (mut templates, ledger) = stores(&state);
        let rent = templates.create(new_template("Rent", today)).unwrap();
        let server = get_test_server(&state);

        server
            .post(endpoints::GENERATE_RECURRING)
            .authorization_bearer("not-the-secret")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get(endpoints::GENERATE_RECURRING)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        assert!(ledger.get_all().unwrap().is_empty());
        assert_eq!(templates.get(rent.id).unwrap(), rent);
    }

    #[tokio::test]
    async fn query_failure_returns_server_error() {
        let state = get_test_state();
        lock(&state)
            .execute("DROP TABLE recurring_transaction", ())
            .unwrap();
        let server = get_test_server(&state);

        let response = server
            .post(endpoints::GENERATE_RECURRING)
            .authorization_bearer(TEST_CRON_SECRET)
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.json::<serde_json::Value>();
        assert!(body["error"].as_str().is_some_and(|message| !message.is_empty()));
    }

    #[tokio::test]
    async fn partial_failure_still_returns_ok() {
        let state = get_test_state();
        let today = today(&state.local_timezone).unwrap();
        let (mut templates, _) = stores(&state);
        templates.create(new_template("Rent", today)).unwrap();
        templates.create(new_template("Power", today)).unwrap();
        // Make every ledger insert for "Power" fail.
        lock(&state)
            .execute(
                "CREATE TRIGGER reject_power BEFORE INSERT ON \"transaction\"
                 WHEN NEW.description = 'Power'
                 BEGIN SELECT RAISE(ABORT, 'power is off'); END",
                (),
            )
            .unwrap();
        let server = get_test_server(&state);

        let response = server
            .post(endpoints::GENERATE_RECURRING)
            .authorization_bearer(TEST_CRON_SECRET)
            .await;

        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["success"], 1);
        assert_eq!(body["errors"], 1);
        let details = body["errorDetails"].as_array().unwrap();
        assert_eq!(details.len(), 1);
        assert!(
            details[0].as_str().unwrap().contains("\"Power\""),
            "got {details:?}"
        );

        let power = templates.get(2).unwrap();
        assert_eq!(power.next_occurrence, today);
        assert_eq!(power.last_generated, None);
    }
}
