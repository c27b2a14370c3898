//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials (wrong password or unknown username).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Authentication succeeded but no customer record matches the login
    /// name. Indicates drift between the identity store and the domain
    /// store; fatal for the attempted login, never retried.
    #[error("no customer record for authenticated user {0:?}")]
    MissingCustomerRecord(String),

    /// The identity store granted a role name outside the known set.
    #[error("identity store misconfiguration: {0}")]
    UnknownRole(#[from] tamarind_core::RoleError),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] tamarind_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Username or email already registered.
    #[error("username or email already registered")]
    AlreadyRegistered,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
