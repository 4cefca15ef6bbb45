//! Application router configuration.

use axum::{
    Router, middleware,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{AppState, Error, auth::cron_auth_guard, endpoints, recurring::generate_recurring_endpoint};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let cron_routes = Router::new()
        .route(
            endpoints::GENERATE_RECURRING,
            get(generate_recurring_endpoint).post(generate_recurring_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), cron_auth_guard));

    Router::new()
        .merge(cron_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
