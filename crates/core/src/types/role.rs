//! Access roles granted to shop principals.

use serde::{Deserialize, Serialize};

/// Error raised when a role name from the identity store is not recognized.
///
/// Unknown names are a configuration defect in the identity store, so the
/// conversion fails loudly instead of skipping the entry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown role name: {0:?}")]
pub struct RoleError(pub String);

/// Closed set of access roles.
///
/// The identity store predates this service and carries the legacy German
/// role names on the wire and in the role table; [`Role::as_str`] and
/// [`std::str::FromStr`] translate between the two worlds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unrestricted access to every resource.
    Admin,
    /// Shop staff; may act on any customer's data.
    Employee,
    /// Department lead; staff reporting role, no extra data access.
    DepartmentHead,
    /// Registered shopper; may only act on their own data.
    Customer,
}

impl Role {
    /// All roles, in a fixed order.
    pub const ALL: [Self; 4] = [
        Self::Admin,
        Self::Employee,
        Self::DepartmentHead,
        Self::Customer,
    ];

    /// The role name as stored by the identity store.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Employee => "mitarbeiter",
            Self::DepartmentHead => "abteilungsleiter",
            Self::Customer => "kunde",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    /// Case-insensitive lookup against the identity store's role names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RoleError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("KUNDE".parse::<Role>().unwrap(), Role::Customer);
        assert_eq!("Mitarbeiter".parse::<Role>().unwrap(), Role::Employee);
        assert_eq!(
            "abteilungsleiter".parse::<Role>().unwrap(),
            Role::DepartmentHead
        );
    }

    #[test]
    fn test_from_str_rejects_unknown_names() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert_eq!(err, RoleError("superuser".to_owned()));
    }

    #[test]
    fn test_round_trip_through_store_name() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }
}
