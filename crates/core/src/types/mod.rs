//! Core types for Tamarind.
//!
//! Scalar domain types shared by every crate in the workspace.

mod email;
mod id;
mod price;
mod role;

pub use email::{Email, EmailError};
pub use id::{ArticleId, CustomerId, OrderId};
pub use price::{CurrencyCode, Price};
pub use role::{Role, RoleError};
