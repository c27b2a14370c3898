//! Business services for the storefront.
//!
//! - [`auth`] - Credential verification, login, registration, role grants
//! - [`authz`] - Ownership-based authorization decisions
//! - [`cart`] - Session-scoped cart state and its scope registry
//! - [`catalog`] - Cached article lookups
//! - [`orders`] - Cart-to-order assembly

pub mod auth;
pub mod authz;
pub mod cart;
pub mod catalog;
pub mod orders;
