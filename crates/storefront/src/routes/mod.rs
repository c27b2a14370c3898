//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Liveness check
//! GET    /health/ready                  - Readiness check (DB ping)
//!
//! # Catalog
//! GET    /articles                      - Article listing
//! GET    /articles/{id}                 - Article detail
//!
//! # Cart (session-scoped)
//! GET    /cart                          - Current cart contents
//! POST   /cart/items                    - Add one unit of an article
//! PUT    /cart/items                    - Set a line's quantity
//! DELETE /cart/items/{article_id}       - Remove a line
//! POST   /cart/checkout                 - Assemble an order from the cart
//!
//! # Auth
//! POST   /auth/login                    - Login action
//! POST   /auth/logout                   - Logout action (invalidates session)
//! POST   /auth/register                 - Customer registration
//! GET    /auth/me                       - Current principal
//!
//! # Customers (ownership-guarded)
//! GET    /customers/{username}          - Customer detail
//! GET    /customers/{username}/orders   - Customer's orders
//! POST   /customers/{username}/roles    - Grant a role (staff only)
//! DELETE /customers/{username}/roles/{role} - Revoke a role (staff only)
//!
//! # Orders (ownership-guarded)
//! GET    /orders/{id}                   - Order detail
//! ```

pub mod articles;
pub mod auth;
pub mod cart;
pub mod customers;
pub mod orders;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/register", post(auth::register))
        .route("/me", get(auth::me))
}

/// Create the article routes router.
pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(articles::index))
        .route("/{id}", get(articles::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add).put(cart::update))
        .route("/items/{article_id}", delete(cart::remove))
        .route("/checkout", post(cart::checkout))
}

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/{username}", get(customers::show))
        .route("/{username}/orders", get(customers::orders))
        .route("/{username}/roles", post(customers::grant_role))
        .route("/{username}/roles/{role}", delete(customers::revoke_role))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/{id}", get(orders::show))
}

/// Create the complete application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/articles", article_routes())
        .nest("/cart", cart_routes())
        .nest("/customers", customer_routes())
        .nest("/orders", order_routes())
}

/// Helper for session write failures inside handlers.
pub(crate) fn session_error(e: tower_sessions::session::Error) -> crate::error::AppError {
    crate::error::AppError::Internal(format!("session error: {e}"))
}
