//! Business services built on top of the repositories.

pub mod cart;
pub mod images;

pub use cart::CartService;
pub use images::ImageSigner;
