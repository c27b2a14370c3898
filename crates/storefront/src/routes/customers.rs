//! Customer route handlers.
//!
//! Every read is ownership-guarded: customers see only themselves, staff
//! see everyone. Role administration is staff-only and takes effect at the
//! target's next login.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tamarind_core::Role;

use crate::db::{CustomerRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Customer, Order};
use crate::services::auth::AuthService;
use crate::services::authz;
use crate::state::AppState;

/// Role grant request body.
#[derive(Debug, Deserialize)]
pub struct GrantRoleRequest {
    pub role: String,
}

/// Role administration response body.
#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub username: String,
    pub roles: Vec<String>,
}

/// One customer by username.
#[instrument(skip(state, principal))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(username): Path<String>,
) -> Result<Json<Customer>> {
    authz::require_same_user(&principal, &username)?;

    let customer = CustomerRepository::new(state.pool())
        .get_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {username}")))?;

    Ok(Json(customer))
}

/// A customer's orders, newest first.
#[instrument(skip(state, principal))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(username): Path<String>,
) -> Result<Json<Vec<Order>>> {
    authz::require_same_user(&principal, &username)?;

    let customer = CustomerRepository::new(state.pool())
        .get_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {username}")))?;

    let orders = OrderRepository::new(state.pool())
        .list_by_customer(customer.id)
        .await?;

    Ok(Json(orders))
}

/// Grant a role to a customer (staff only).
#[instrument(skip(state, principal, body))]
pub async fn grant_role(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(username): Path<String>,
    Json(body): Json<GrantRoleRequest>,
) -> Result<Json<RolesResponse>> {
    authz::require_staff(&principal)?;

    let role = parse_role(&body.role)?;
    let customer = require_customer(&state, &username).await?;

    let roles = AuthService::new(state.pool())
        .grant_role(customer.id, role)
        .await?;

    tracing::info!(target_customer = %customer.id, %role, granted_by = %principal.name, "role granted");

    Ok(Json(RolesResponse { username, roles }))
}

/// Revoke a role from a customer (staff only).
#[instrument(skip(state, principal))]
pub async fn revoke_role(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path((username, role)): Path<(String, String)>,
) -> Result<Json<RolesResponse>> {
    authz::require_staff(&principal)?;

    let role = parse_role(&role)?;
    let customer = require_customer(&state, &username).await?;

    let roles = AuthService::new(state.pool())
        .revoke_role(customer.id, role)
        .await?;

    tracing::info!(target_customer = %customer.id, %role, revoked_by = %principal.name, "role revoked");

    Ok(Json(RolesResponse { username, roles }))
}

fn parse_role(name: &str) -> Result<Role> {
    name.parse::<Role>()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

async fn require_customer(state: &AppState, username: &str) -> Result<Customer> {
    CustomerRepository::new(state.pool())
        .get_by_username(username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {username}")))
}
