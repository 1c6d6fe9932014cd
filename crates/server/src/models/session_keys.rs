//! Session keys for identity data.
//!
//! Cart identity is read exclusively from server-managed session state;
//! client-supplied user ids are never trusted.

/// Key for the authenticated user's id (set by the auth flow).
pub const CURRENT_USER_ID: &str = "current_user_id";

/// Key for the anonymous cart token, generated on first cart access.
pub const CART_TOKEN: &str = "cart_token";
