//! Romanian Football Store client library.
//!
//! Keeps local copies of the shopper's cart and wishlist and of the admin
//! inventory in step with the REST backend. Mutations are applied to the
//! local list first and reconciled with the server afterwards; a failed
//! request is undone by refetching the whole collection.
//!
//! # Modules
//!
//! - [`config`] - environment-driven configuration
//! - [`api`] - typed REST bindings (`ApiClient`) and wire records
//! - [`session`] - the authenticated user, passed explicitly to controllers
//! - [`sync`] - the generic [`CollectionSync`] controller, its cart,
//!   wishlist and inventory instantiations, and [`Checkout`] over the cart
//!
//! # Example
//!
//! ```rust,no_run
//! use football_store_client::{ApiClient, CartSync, ClientConfig, Session};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let api = ApiClient::new(&config)?;
//! let session = Session::restore(&api).await;
//! let Ok(user) = session.require_user() else {
//!     // redirect to the login screen instead of loading anything
//!     return Ok(());
//! };
//!
//! let cart = CartSync::new(api.clone(), user);
//! cart.load().await?;
//! if let Some(first) = cart.items().first() {
//!     cart.increment(first.id).await?;
//! }
//! println!("subtotal: {}", cart.subtotal());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod sync;

pub use api::{ApiClient, ApiError};
pub use config::{ClientConfig, ConfigError, Credentials};
pub use error::{FieldErrors, SyncError};
pub use session::{CurrentUser, Session};
pub use sync::{
    AddToCart, CartMutation, CartSource, CartSync, Checkout, CollectionItem, CollectionSource,
    CollectionSync, Coupon, InventoryMutation, InventorySource, InventoryStats, InventorySync,
    Notice, Pending, PlacedOrder, Route, Severity, ShippingAddress, StockForm, SyncEvent,
    ValidStock, WishlistSource, WishlistSync,
};
