//! Authentication middleware that checks the cron service's bearer token.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use sha2::{Digest, Sha512};

use crate::{AppState, Error};

/// The state needed for the cron auth middleware.
#[derive(Debug, Clone)]
pub struct CronAuthState {
    /// The SHA-512 digest of the configured cron secret.
    pub cron_secret_hash: Arc<[u8]>,
}

impl FromRef<AppState> for CronAuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cron_secret_hash: state.cron_secret_hash.clone(),
        }
    }
}

impl CronAuthState {
    /// Whether `token` matches the configured cron secret.
    ///
    /// The SHA-512 digests of the token and the secret are compared, never the raw strings.
    pub fn accepts(&self, token: &str) -> bool {
        hash_secret(token)[..] == self.cron_secret_hash[..]
    }
}

/// Hash a secret or token for [CronAuthState].
pub fn hash_secret(secret: &str) -> Arc<[u8]> {
    Arc::from(Sha512::digest(secret).as_slice())
}

/// Middleware function that checks for an `authorization: Bearer <token>` header matching the
/// cron secret.
///
/// The request is executed normally if the token matches, otherwise a 401 response is returned
/// without calling the route handler.
pub async fn cron_auth_guard(
    State(state): State<CronAuthState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let token = match TypedHeader::<Authorization<Bearer>>::from_request_parts(&mut parts, &state)
        .await
    {
        Ok(TypedHeader(Authorization(bearer))) => bearer,
        Err(rejection) => {
            tracing::warn!(
                "Rejected request to {} without a valid bearer token: {rejection}",
                parts.uri
            );
            return Error::Unauthorized.into_response();
        }
    };

    if !state.accepts(token.token()) {
        tracing::warn!("Rejected request to {} with an incorrect bearer token", parts.uri);
        return Error::Unauthorized.into_response();
    }

    let request = Request::from_parts(parts, body);
    next.run(request).await
}
