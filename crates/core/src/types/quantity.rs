//! Validated cart line quantity.
//!
//! A cart line always holds between 1 and 99 units. The bounds are enforced
//! at construction so repositories and services never see an out-of-range
//! value.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Smallest quantity a cart line may hold.
pub const MIN_QUANTITY: i32 = 1;

/// Largest quantity a cart line may hold.
pub const MAX_QUANTITY: i32 = 99;

/// Error returned when a quantity is outside the allowed range.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("quantity must be between {min} and {max} (got {0})", min = MIN_QUANTITY, max = MAX_QUANTITY)]
pub struct QuantityError(pub i32);

/// A cart line quantity, guaranteed to be within `1..=99`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(i32);

impl Quantity {
    /// Create a validated quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError`] if `value` is outside `1..=99`.
    pub const fn new(value: i32) -> Result<Self, QuantityError> {
        if value >= MIN_QUANTITY && value <= MAX_QUANTITY {
            Ok(Self(value))
        } else {
            Err(QuantityError(value))
        }
    }

    /// A quantity of one unit.
    pub const ONE: Self = Self(MIN_QUANTITY);

    /// Get the underlying value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Add another quantity, saturating at the line maximum.
    ///
    /// Used by merge-on-add: repeated adds of the same variant accumulate,
    /// but a line never exceeds [`MAX_QUANTITY`].
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        let sum = self.0 + other.0;
        if sum > MAX_QUANTITY {
            Self(MAX_QUANTITY)
        } else {
            Self(sum)
        }
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

// Deserialization goes through `new` so an out-of-range body field is a
// deserialization error, not a silently accepted value.
impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i32::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Quantity {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Quantity {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<'_, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Quantity {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i32 as sqlx::Decode<'_, sqlx::Postgres>>::decode(value)?;
        Self::new(raw).map_err(Into::into)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_boundaries() {
        assert_eq!(Quantity::new(1).unwrap().as_i32(), 1);
        assert_eq!(Quantity::new(99).unwrap().as_i32(), 99);
    }

    #[test]
    fn rejects_outside_boundaries() {
        assert_eq!(Quantity::new(0), Err(QuantityError(0)));
        assert_eq!(Quantity::new(100), Err(QuantityError(100)));
        assert_eq!(Quantity::new(-5), Err(QuantityError(-5)));
    }

    #[test]
    fn saturating_add_caps_at_max() {
        let a = Quantity::new(60).unwrap();
        let b = Quantity::new(50).unwrap();
        assert_eq!(a.saturating_add(b).as_i32(), MAX_QUANTITY);

        let c = Quantity::new(2).unwrap();
        let d = Quantity::new(3).unwrap();
        assert_eq!(c.saturating_add(d).as_i32(), 5);
    }

    #[test]
    fn deserialization_enforces_the_range() {
        assert_eq!(
            serde_json::from_str::<Quantity>("5").unwrap(),
            Quantity::new(5).unwrap()
        );

        let err = serde_json::from_str::<Quantity>("100").unwrap_err();
        assert!(err.to_string().contains("quantity must be between"));
        assert!(serde_json::from_str::<Quantity>("0").is_err());
    }

    #[test]
    fn error_message_names_bounds() {
        let err = Quantity::new(100).unwrap_err();
        assert_eq!(
            err.to_string(),
            "quantity must be between 1 and 99 (got 100)"
        );
    }
}
