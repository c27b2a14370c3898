//! Ownership-based authorization decisions.
//!
//! Pure functions over an already-established [`Principal`]; no I/O, no
//! state. Staff roles (admin, employee) may act on anything, customers only
//! on resources owned by their own identity. Every denial is a structured
//! error so callers can never mistake it for a successful no-op.

use tamarind_core::{CustomerId, Role};

use crate::models::Principal;

/// Authorization failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// The principal may not act on the requested resource.
    #[error("access denied for {principal:?}")]
    Denied {
        /// Name of the principal that was turned away.
        principal: String,
    },
}

impl AuthzError {
    fn denied(principal: &Principal) -> Self {
        Self::Denied {
            principal: principal.name.clone(),
        }
    }
}

/// Allow staff unconditionally; otherwise the principal must hold the
/// `Customer` role and its name must equal `required_username` exactly
/// (case-sensitive).
///
/// # Errors
///
/// Returns `AuthzError::Denied` on any mismatch or missing role.
pub fn require_same_user(
    principal: &Principal,
    required_username: &str,
) -> Result<(), AuthzError> {
    if principal.has_role(Role::Admin) || principal.has_role(Role::Employee) {
        tracing::trace!(principal = %principal.name, "staff role, ownership check skipped");
        return Ok(());
    }

    if principal.has_role(Role::Customer) && principal.name == required_username {
        return Ok(());
    }

    Err(AuthzError::denied(principal))
}

/// Same as [`require_same_user`], for a numeric customer identity.
///
/// An absent identity is denied before any role is consulted: there is no
/// resource a missing ID could possibly own.
///
/// # Errors
///
/// Returns `AuthzError::Denied` when `required` is `None` or the ownership
/// check fails.
pub fn require_same_user_id(
    principal: &Principal,
    required: Option<CustomerId>,
) -> Result<(), AuthzError> {
    match required {
        None => Err(AuthzError::denied(principal)),
        Some(id) => require_same_user(principal, &id.to_string()),
    }
}

/// Allow only staff (admin or employee) principals.
///
/// # Errors
///
/// Returns `AuthzError::Denied` for everyone else.
pub fn require_staff(principal: &Principal) -> Result<(), AuthzError> {
    if principal.has_role(Role::Admin) || principal.has_role(Role::Employee) {
        return Ok(());
    }
    Err(AuthzError::denied(principal))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn principal(name: &str, roles: &[Role]) -> Principal {
        Principal::new(name, roles.iter().copied().collect())
    }

    #[test]
    fn test_customer_may_only_access_own_identity() {
        let p = principal("102", &[Role::Customer]);
        assert!(require_same_user(&p, "102").is_ok());
        assert!(require_same_user(&p, "105").is_err());
    }

    #[test]
    fn test_name_comparison_is_case_sensitive() {
        let p = principal("Alice", &[Role::Customer]);
        assert!(require_same_user(&p, "Alice").is_ok());
        assert!(require_same_user(&p, "alice").is_err());
    }

    #[test]
    fn test_staff_roles_bypass_ownership() {
        for role in [Role::Admin, Role::Employee] {
            let p = principal("999", &[role]);
            assert!(require_same_user(&p, "105").is_ok());
            assert!(require_same_user_id(&p, Some(CustomerId::new(105))).is_ok());
        }
    }

    #[test]
    fn test_department_head_alone_grants_nothing() {
        let p = principal("102", &[Role::DepartmentHead]);
        assert!(require_same_user(&p, "102").is_err());
        assert!(require_staff(&p).is_err());
    }

    #[test]
    fn test_missing_customer_role_denies_even_on_name_match() {
        let p = principal("102", &[]);
        assert!(require_same_user(&p, "102").is_err());
    }

    #[test]
    fn test_absent_numeric_identity_denies_regardless_of_role() {
        for roles in [&[Role::Admin][..], &[Role::Customer][..], &[][..]] {
            let p = principal("102", roles);
            assert!(require_same_user_id(&p, None).is_err());
        }
    }

    #[test]
    fn test_numeric_identity_matches_by_string_equality() {
        let p = principal("102", &[Role::Customer]);
        assert!(require_same_user_id(&p, Some(CustomerId::new(102))).is_ok());
        assert!(require_same_user_id(&p, Some(CustomerId::new(105))).is_err());
    }

    #[test]
    fn test_require_staff() {
        assert!(require_staff(&principal("1", &[Role::Admin])).is_ok());
        assert!(require_staff(&principal("1", &[Role::Employee])).is_ok());
        assert!(require_staff(&principal("1", &[Role::Customer])).is_err());
    }
}
