//! Role extraction from the identity store's subject structure.
//!
//! The identity store answers a successful credential check with an opaque
//! group graph: named groups, each holding member name strings. Only two
//! groups matter here: `CallerPrincipal` (the login name) and `Roles` (the
//! granted role names). This module converts the latter into typed [`Role`]
//! values exactly once, at login.

use std::collections::BTreeSet;

use tamarind_core::{Role, RoleError};

/// Group holding the authenticated login name.
pub const CALLER_PRINCIPAL_GROUP: &str = "CallerPrincipal";

/// Group holding the granted role names.
pub const ROLES_GROUP: &str = "Roles";

/// One named group inside an [`AuthenticatedSubject`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectGroup {
    /// Group name, e.g. `"Roles"`.
    pub name: String,
    /// Member names inside the group.
    pub members: Vec<String>,
}

impl SubjectGroup {
    /// Build a group from a name and its members.
    pub fn new(name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }
}

/// The identity store's answer to a successful credential check.
///
/// Treated as opaque: callers only ever look up groups by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSubject {
    groups: Vec<SubjectGroup>,
}

impl AuthenticatedSubject {
    /// Build a subject from its groups.
    #[must_use]
    pub fn new(groups: Vec<SubjectGroup>) -> Self {
        Self { groups }
    }

    /// Find a group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&SubjectGroup> {
        self.groups.iter().find(|g| g.name == name)
    }
}

/// Extract the granted roles from a subject's `Roles` group.
///
/// Names are matched case-insensitively against the role enumeration;
/// duplicates collapse and member order is irrelevant. A subject without a
/// `Roles` group simply has no roles.
///
/// # Errors
///
/// Returns `RoleError` if any member name maps to no known role. This is a
/// store misconfiguration and must surface instead of being skipped.
pub fn roles_from_subject(subject: &AuthenticatedSubject) -> Result<BTreeSet<Role>, RoleError> {
    let Some(group) = subject.group(ROLES_GROUP) else {
        return Ok(BTreeSet::new());
    };

    group.members.iter().map(|name| name.parse()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn subject_with_roles(names: &[&str]) -> AuthenticatedSubject {
        AuthenticatedSubject::new(vec![
            SubjectGroup::new(CALLER_PRINCIPAL_GROUP, vec!["102".to_owned()]),
            SubjectGroup::new(
                ROLES_GROUP,
                names.iter().map(|s| (*s).to_owned()).collect(),
            ),
        ])
    }

    #[test]
    fn test_maps_store_names_to_role_set() {
        let roles = roles_from_subject(&subject_with_roles(&["admin", "kunde"])).unwrap();
        assert_eq!(
            roles,
            BTreeSet::from([Role::Admin, Role::Customer]),
        );
    }

    #[test]
    fn test_order_and_duplicates_are_irrelevant() {
        let forward = roles_from_subject(&subject_with_roles(&["admin", "kunde"])).unwrap();
        let reversed = roles_from_subject(&subject_with_roles(&["kunde", "admin"])).unwrap();
        let doubled =
            roles_from_subject(&subject_with_roles(&["kunde", "admin", "kunde"])).unwrap();
        assert_eq!(forward, reversed);
        assert_eq!(forward, doubled);
    }

    #[test]
    fn test_unknown_role_name_is_an_error() {
        let result = roles_from_subject(&subject_with_roles(&["kunde", "superuser"]));
        assert_eq!(result.unwrap_err(), RoleError("superuser".to_owned()));
    }

    #[test]
    fn test_subject_without_roles_group_has_no_roles() {
        let subject = AuthenticatedSubject::new(vec![SubjectGroup::new(
            CALLER_PRINCIPAL_GROUP,
            vec!["102".to_owned()],
        )]);
        assert!(roles_from_subject(&subject).unwrap().is_empty());
    }
}
