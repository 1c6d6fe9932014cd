//! Domain models returned by repositories and serialized into responses.

pub mod cart;
pub mod catalog;
pub mod category;
pub mod product;
pub mod session_keys;
