//! Anonymous cart token.
//!
//! Carts that belong to a visitor without an account are keyed by a random
//! token stored in the server-managed session. The token is opaque to the
//! client and never derived from client-supplied identifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque token identifying an anonymous visitor's cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartToken(String);

impl CartToken {
    /// Generate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing token value (e.g., read back from the session).
    #[must_use]
    pub fn from_string(value: String) -> Self {
        Self(value)
    }

    /// The token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CartToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_unique() {
        assert_ne!(CartToken::generate(), CartToken::generate());
    }

    #[test]
    fn round_trips_through_string() {
        let token = CartToken::from_string("abc-123".to_string());
        assert_eq!(token.as_str(), "abc-123");
        assert_eq!(token.to_string(), "abc-123");
    }
}
