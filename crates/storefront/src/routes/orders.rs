//! Order route handlers.
//!
//! Orders are readable only by their owning customer or staff; the guard
//! runs against the owning customer's identity after the load.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use tamarind_core::OrderId;

use crate::db::{CustomerRepository, OrderRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::services::authz;
use crate::state::AppState;

/// One order by ID.
#[instrument(skip(state, principal))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let owner = CustomerRepository::new(state.pool())
        .get_by_id(order.customer_id)
        .await?
        .ok_or_else(|| {
            AppError::Database(RepositoryError::DataCorruption(format!(
                "order {id} references missing customer {}",
                order.customer_id
            )))
        })?;

    authz::require_same_user(&principal, &owner.username)?;

    Ok(Json(order))
}
