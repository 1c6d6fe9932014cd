//! Core types for Meridian.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod quantity;
pub mod token;

pub use id::*;
pub use quantity::{Quantity, QuantityError};
pub use token::CartToken;
