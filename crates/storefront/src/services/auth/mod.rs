//! Authentication service.
//!
//! Verifies credentials against the identity store, turns the store's opaque
//! subject into a [`Principal`] exactly once per login, and handles customer
//! registration and role administration.

mod error;
pub mod roles;

pub use error::AuthError;
pub use roles::{AuthenticatedSubject, SubjectGroup};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use tamarind_core::{CustomerId, Email, Role};

use crate::db::RepositoryError;
use crate::db::customers::{CustomerRepository, NewCustomer};
use crate::models::{Customer, Principal};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles registration, login, and role grants.
pub struct AuthService<'a> {
    customers: CustomerRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            customers: CustomerRepository::new(pool),
        }
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Verify credentials against the identity store.
    ///
    /// Returns the store's subject structure (caller-principal and role-name
    /// groups) without touching the domain customer record.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username is unknown or
    /// the password does not match.
    pub async fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedSubject, AuthError> {
        let hash = self
            .customers
            .get_password_hash(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &hash)?;

        let role_names = self.customers.get_role_names_by_username(username).await?;

        Ok(AuthenticatedSubject::new(vec![
            SubjectGroup::new(roles::CALLER_PRINCIPAL_GROUP, vec![username.to_owned()]),
            SubjectGroup::new(roles::ROLES_GROUP, role_names),
        ]))
    }

    /// Log a customer in.
    ///
    /// On success the returned [`Principal`] carries the roles extracted from
    /// the subject; it is the only place roles are ever derived.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a bad username/password
    /// (recoverable; the session stays anonymous).
    /// Returns `AuthError::MissingCustomerRecord` if authentication succeeded
    /// but no customer row matches the username: a data-integrity failure
    /// between the identity store and the domain store, aborting the login.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(Principal, Customer), AuthError> {
        let subject = self.verify(username, password).await?;
        let granted = roles::roles_from_subject(&subject)?;

        let customer = self
            .customers
            .get_by_username(username)
            .await?
            .ok_or_else(|| AuthError::MissingCustomerRecord(username.to_owned()))?;

        Ok((Principal::new(username, granted), customer))
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a new customer with the `Customer` role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::AlreadyRegistered` if the username or email is taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        password: &str,
    ) -> Result<Customer, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let customer = self
            .customers
            .create(NewCustomer {
                username,
                email: &email,
                first_name,
                last_name,
                password_hash: &password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AlreadyRegistered,
                other => AuthError::Repository(other),
            })?;

        Ok(customer)
    }

    // =========================================================================
    // Role Administration
    // =========================================================================

    /// Grant a role to a customer.
    ///
    /// Takes effect at the customer's next login; live sessions keep the
    /// principal they were built with.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the customer does not exist or the
    /// database operation fails.
    pub async fn grant_role(&self, id: CustomerId, role: Role) -> Result<Vec<String>, AuthError> {
        self.customers.add_role(id, role).await?;
        Ok(self.customers.get_role_names(id).await?)
    }

    /// Revoke a role from a customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the customer does not exist or the
    /// database operation fails.
    pub async fn revoke_role(&self, id: CustomerId, role: Role) -> Result<Vec<String>, AuthError> {
        self.customers.remove_role(id, role).await?;
        Ok(self.customers.get_role_names(id).await?)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long-enough-password").is_ok());
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
