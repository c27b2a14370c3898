//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-class errors to
//! Sentry before responding to the client. All route handlers should return
//! `Result<T, AppError>`.
//!
//! The error taxonomy maps onto HTTP statuses as follows: validation
//! failures are 422, bad credentials 401, ownership denials 403, optimistic
//! concurrency conflicts 409, and consistency failures (identity store and
//! domain store out of sync) 500. The consistency class is always captured
//! and never retried.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::authz::AuthzError;
use crate::services::cart::CartError;
use crate::services::catalog::CatalogError;
use crate::services::orders::OrderError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Ownership/role check denied the request.
    #[error("Authorization error: {0}")]
    Authz(#[from] AuthzError),

    /// Cart mutation rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Order assembly failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Catalog lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error indicates a server-side failure worth capturing.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Internal(_) => true,
            Self::Auth(err) => matches!(
                err,
                AuthError::MissingCustomerRecord(_)
                    | AuthError::UnknownRole(_)
                    | AuthError::Repository(_)
                    | AuthError::PasswordHash
            ),
            Self::Order(err) => matches!(
                err,
                OrderError::CustomerGone(_) | OrderError::Repository(_)
            ),
            Self::Catalog(err) => matches!(err, CatalogError::Repository(_)),
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::AlreadyRegistered => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Authz(_) => StatusCode::FORBIDDEN,
            Self::Cart(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Order(err) => match err {
                OrderError::NoActiveCart | OrderError::EmptyCart => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                OrderError::Forbidden(_) => StatusCode::FORBIDDEN,
                OrderError::Conflict => StatusCode::CONFLICT,
                OrderError::CustomerGone(_) | OrderError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Catalog(err) => match err {
                CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
                CatalogError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message; internal details stay out of responses.
    fn message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::AlreadyRegistered => {
                    "An account with this username or email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                _ => "Authentication error".to_string(),
            },
            Self::Authz(_) | Self::Order(OrderError::Forbidden(_)) => "Access denied".to_string(),
            Self::Order(err) => match err {
                OrderError::NoActiveCart | OrderError::EmptyCart => err.to_string(),
                OrderError::Conflict => {
                    "Your data was modified concurrently, please retry".to_string()
                }
                _ => "Internal server error".to_string(),
            },
            Self::Catalog(CatalogError::Repository(_)) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = Json(json!({ "error": self.message() }));
        (self.status(), body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a username.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tamarind_core::ArticleId;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_taxonomy_status_mapping() {
        assert_eq!(
            status_of(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Authz(AuthzError::Denied {
                principal: "102".into()
            })),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::Cart(CartError::InvalidQuantity(-1))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::Order(OrderError::EmptyCart)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::Order(OrderError::Conflict)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Catalog(CatalogError::NotFound(ArticleId::new(1)))),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_consistency_failures_are_server_errors() {
        let err = AppError::Auth(AuthError::MissingCustomerRecord("102".into()));
        assert!(err.is_server_error());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = AppError::Order(OrderError::CustomerGone("102".into()));
        assert!(err.is_server_error());
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "invalid email in row 7".into(),
        ));
        assert_eq!(err.message(), "Internal server error");
    }
}
