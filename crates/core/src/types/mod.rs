//! Core types for the storefront client.

pub mod email;
pub mod id;
pub mod price;
pub mod quantity;
pub mod size;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use quantity::{CartQuantity, QuantityError, StockQuantity};
pub use size::{Size, SizeError};
pub use status::*;
