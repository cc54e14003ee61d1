//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use moto_parts_core::{Role, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's id in the store API.
    pub id: UserId,
    /// What the user may do.
    pub role: Role,
}

/// Session keys.
pub mod keys {
    /// Key for the persisted cart document.
    pub const CART: &str = "cart";

    /// Key for the logged-in user's id.
    pub const USER_ID: &str = "user_id";

    /// Key for the logged-in user's role.
    pub const USER_ROLE: &str = "user_role";

    /// Set once a checkout has placed an order.
    pub const ORDER_CREATED: &str = "order_created";
}
