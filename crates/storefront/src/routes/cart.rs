//! Cart route handlers.
//!
//! The session stores only the cart scope ID; the cart itself lives in the
//! in-memory scope registry. Handlers here are thin: resolve the scope from
//! the session, apply the mutation, and render the resulting cart.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use tamarind_core::ArticleId;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{Order, session_keys};
use crate::routes::session_error;
use crate::services::cart::Cart;
use crate::services::orders::OrderService;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub article_id: ArticleId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: Decimal,
    pub item_count: u64,
}

impl CartView {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: Decimal::ZERO,
            item_count: 0,
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let items: Vec<CartItemView> = cart
            .lines()
            .iter()
            .map(|line| CartItemView {
                article_id: line.article.id,
                name: line.article.name.clone(),
                quantity: line.quantity,
                unit_price: line.article.price.amount,
                line_total: line.article.price.times(line.quantity).amount,
            })
            .collect();
        let subtotal = items.iter().map(|i| i.line_total).sum();

        Self {
            items,
            subtotal,
            item_count: cart.total_quantity(),
        }
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub article_id: ArticleId,
}

/// Set-quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub article_id: ArticleId,
    /// Signed on purpose: negative values must reach the validator and be
    /// rejected there, not vanish in deserialization.
    pub quantity: i64,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart scope ID from the session.
async fn get_cart_scope(session: &Session) -> Option<Uuid> {
    session
        .get::<Uuid>(session_keys::CART_SCOPE)
        .await
        .ok()
        .flatten()
}

/// Set the cart scope ID in the session.
async fn set_cart_scope(
    session: &Session,
    scope_id: Uuid,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART_SCOPE, scope_id).await
}

/// Remove the cart scope ID from the session.
async fn clear_cart_scope(
    session: &Session,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.remove::<Uuid>(session_keys::CART_SCOPE).await?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Current cart contents.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Json<CartView> {
    let scope_id = get_cart_scope(&session).await;
    let view = match state.carts().snapshot(scope_id).await {
        Some(cart) => CartView::from(&cart),
        None => CartView::empty(),
    };
    Json(view)
}

/// Add one unit of an article to the cart.
///
/// Begins a fresh cart scope if the session has none; repeated adds of the
/// same article merge into one line.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let article = state.catalog().lookup(body.article_id).await?;

    let scope_id = get_cart_scope(&session).await;
    let (scope_id, cart) = state.carts().add_article(scope_id, article).await;

    set_cart_scope(&session, scope_id)
        .await
        .map_err(session_error)?;

    Ok(Json(CartView::from(&cart)))
}

/// Set the quantity of a cart line.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let scope_id = get_cart_scope(&session).await;
    let cart = state
        .carts()
        .set_quantity(scope_id, body.article_id, body.quantity)
        .await?;

    Ok(Json(CartView::from(&cart)))
}

/// Remove a cart line.
///
/// Removing the last line ends the cart scope; the session forgets it and a
/// later add starts from an empty cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(article_id): Path<ArticleId>,
) -> Result<Json<CartView>> {
    let scope_id = get_cart_scope(&session).await;
    let outcome = state.carts().remove_article(scope_id, article_id).await?;

    if outcome.scope_ended {
        clear_cart_scope(&session).await.map_err(session_error)?;
    }

    Ok(Json(CartView::from(&outcome.cart)))
}

/// Assemble an order from the cart.
///
/// Requires an authenticated session; the order is placed for the session's
/// own customer identity, which the ownership guard re-checks.
#[instrument(skip(state, session, principal))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(principal): RequireAuth,
) -> Result<(StatusCode, Json<Order>)> {
    let scope_id = get_cart_scope(&session).await;

    let order = OrderService::new(state.pool())
        .place_order(state.carts(), scope_id, &principal, &principal.name)
        .await?;

    // The scope is gone either way once assembly got past validation.
    clear_cart_scope(&session).await.map_err(session_error)?;

    Ok((StatusCode::CREATED, Json(order)))
}
