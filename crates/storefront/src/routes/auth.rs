//! Authentication route handlers.
//!
//! Login binds a [`crate::models::Principal`] to the session; logout
//! invalidates the whole session, cart scope included. A session is in
//! exactly one of two states: anonymous (no principal stored) or
//! authenticated.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use tamarind_core::{CustomerId, Role};

use crate::error::{self, AppError, Result};
use crate::middleware::{clear_session_principal, set_session_principal};
use crate::models::session_keys;
use crate::routes::session_error;
use crate::services::auth::AuthService;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Authenticated-session response body.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub username: String,
    pub roles: Vec<Role>,
    pub customer_id: CustomerId,
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle a login attempt.
///
/// Bad credentials leave the session anonymous and report a recoverable 401.
/// A missing customer record for an authenticated username is a consistency
/// failure and surfaces as a server error instead.
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    let auth = AuthService::new(state.pool());
    let (principal, customer) = auth.login(&body.username, &body.password).await?;

    set_session_principal(&session, &principal)
        .await
        .map_err(session_error)?;
    error::set_sentry_user(&principal.name);

    tracing::info!(username = %principal.name, "login succeeded");

    Ok(Json(SessionResponse {
        username: principal.name,
        roles: principal.roles.into_iter().collect(),
        customer_id: customer.id,
    }))
}

/// Handle logout.
///
/// Invalidates the entire session: principal, cart scope, and any other
/// session-bound state are gone afterwards.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<StatusCode> {
    // End the live cart scope before the session record disappears.
    if let Ok(Some(scope_id)) = session.get::<Uuid>(session_keys::CART_SCOPE).await {
        state.carts().end(scope_id).await;
    }

    clear_session_principal(&session)
        .await
        .map_err(session_error)?;
    session.flush().await.map_err(session_error)?;
    error::clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}

/// Handle customer registration.
///
/// The new customer is created with the `Customer` role and can log in
/// immediately; registration does not log the session in by itself.
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let auth = AuthService::new(state.pool());
    let customer = auth
        .register(
            &body.username,
            &body.email,
            &body.first_name,
            &body.last_name,
            &body.password,
        )
        .await?;

    tracing::info!(username = %customer.username, customer = %customer.id, "customer registered");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "customer_id": customer.id,
            "username": customer.username,
        })),
    ))
}

/// Return the session's principal, or 401 for anonymous sessions.
#[instrument(skip(state, principal))]
pub async fn me(
    State(state): State<AppState>,
    crate::middleware::RequireAuth(principal): crate::middleware::RequireAuth,
) -> Result<Json<SessionResponse>> {
    let customer = crate::db::CustomerRepository::new(state.pool())
        .get_by_username(&principal.name)
        .await?
        .ok_or_else(|| AppError::Auth(crate::services::auth::AuthError::MissingCustomerRecord(
            principal.name.clone(),
        )))?;

    Ok(Json(SessionResponse {
        username: principal.name,
        roles: principal.roles.into_iter().collect(),
        customer_id: customer.id,
    }))
}
