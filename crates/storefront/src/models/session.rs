//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use tamarind_core::Role;

/// The authenticated identity bound to a session.
///
/// Built exactly once at login from the identity store's answer and threaded
/// through every authorization check afterwards; nothing re-derives roles
/// from the store mid-session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Login name of the authenticated customer.
    pub name: String,
    /// Roles granted by the identity store.
    pub roles: BTreeSet<Role>,
}

impl Principal {
    /// Create a principal from a name and its granted roles.
    #[must_use]
    pub fn new(name: impl Into<String>, roles: BTreeSet<Role>) -> Self {
        Self {
            name: name.into(),
            roles,
        }
    }

    /// Whether the principal holds the given role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Session keys for authentication and cart data.
pub mod session_keys {
    /// Key for storing the logged-in principal.
    pub const PRINCIPAL: &str = "principal";

    /// Key for the active cart scope ID.
    pub const CART_SCOPE: &str = "cart_scope";
}
