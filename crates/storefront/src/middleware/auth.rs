//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring an authenticated principal in route
//! handlers. The principal is established once at login and read back from
//! the session here; no handler re-derives roles.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{Principal, session_keys};

/// Extractor that requires an authenticated principal.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(principal): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", principal.name)
/// }
/// ```
pub struct RequireAuth(pub Principal);

/// Error returned when authentication is required but the session is
/// anonymous.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Authentication required" })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts.extensions.get::<Session>().ok_or(AuthRejection)?;

        let principal: Principal = session
            .get(session_keys::PRINCIPAL)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection)?;

        Ok(Self(principal))
    }
}

/// Extractor that optionally gets the current principal.
///
/// Unlike `RequireAuth`, this does not reject anonymous sessions.
pub struct OptionalAuth(pub Option<Principal>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<Principal>(session_keys::PRINCIPAL)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(principal))
    }
}

/// Helper to bind the principal to the session at login.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_session_principal(
    session: &Session,
    principal: &Principal,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::PRINCIPAL, principal).await
}

/// Helper to clear the principal from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_session_principal(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session.remove::<Principal>(session_keys::PRINCIPAL).await?;
    Ok(())
}
