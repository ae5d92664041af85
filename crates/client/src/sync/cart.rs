//! The shopper's cart.

use std::ops::Deref;

use football_store_core::{CartItemId, CartQuantity, Price, ProductId, Size, UserId};
use tracing::{info, instrument};

use super::{CollectionItem, CollectionSource, CollectionSync, Notice, SyncEvent};
use crate::api::types::{AddToCartRequest, CartItem};
use crate::api::{ApiClient, ApiError};
use crate::error::{FieldErrors, SyncError};
use crate::session::CurrentUser;

impl CollectionItem for CartItem {
    type Id = CartItemId;

    fn id(&self) -> CartItemId {
        self.id
    }
}

/// Changes a shopper can make to a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartMutation {
    /// Set the line quantity. Valid within `CartQuantity::MIN..=MAX`.
    SetQuantity(i64),
}

/// The cart of one user, as a server collection.
#[derive(Debug, Clone, Copy)]
pub struct CartSource {
    owner: UserId,
}

impl CartSource {
    #[must_use]
    pub const fn new(owner: UserId) -> Self {
        Self { owner }
    }

    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }
}

impl CollectionSource for CartSource {
    type Item = CartItem;
    type Mutation = CartMutation;

    const NAME: &'static str = "cart";

    async fn fetch(&self, api: &ApiClient) -> Result<Vec<CartItem>, ApiError> {
        api.cart_items(self.owner).await
    }

    fn validate(&self, _item: &CartItem, mutation: &CartMutation) -> bool {
        match mutation {
            CartMutation::SetQuantity(quantity) => CartQuantity::contains(*quantity),
        }
    }

    fn apply(&self, item: &mut CartItem, mutation: &CartMutation) {
        match mutation {
            CartMutation::SetQuantity(quantity) => {
                if let Ok(quantity) = CartQuantity::new(*quantity) {
                    item.quantity = quantity.get();
                }
            }
        }
    }

    async fn push(
        &self,
        api: &ApiClient,
        item: &CartItem,
        _mutation: &CartMutation,
    ) -> Result<(), ApiError> {
        api.update_cart_item_quantity(item.id, item.quantity).await
    }

    async fn delete(&self, api: &ApiClient, id: CartItemId) -> Result<(), ApiError> {
        api.delete_cart_item(id).await
    }
}

/// A product line to put in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddToCart {
    pub product_id: ProductId,
    pub size: Size,
    pub quantity: i64,
    /// Player name to print on the jersey.
    pub player: Option<String>,
    /// Shirt number to print on the jersey.
    pub number: Option<String>,
}

/// Cart controller for the logged-in shopper.
///
/// Derefs to the generic [`CollectionSync`] for `load`, `items` and `remove`.
#[derive(Debug)]
pub struct CartSync {
    inner: CollectionSync<CartSource>,
}

impl Deref for CartSync {
    type Target = CollectionSync<CartSource>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl CartSync {
    /// Cart controller for `user`.
    #[must_use]
    pub fn new(api: ApiClient, user: &CurrentUser) -> Self {
        Self {
            inner: CollectionSync::new(api, CartSource::new(user.id)),
        }
    }

    fn quantity_of(&self, id: CartItemId) -> Option<CartQuantity> {
        self.get(id)
            .and_then(|item| CartQuantity::new(i64::from(item.quantity)).ok())
    }

    /// Whether the "+" control of a line is enabled.
    pub fn can_increment(&self, id: CartItemId) -> bool {
        self.quantity_of(id)
            .and_then(CartQuantity::incremented)
            .is_some()
    }

    /// Whether the "-" control of a line is enabled.
    pub fn can_decrement(&self, id: CartItemId) -> bool {
        self.quantity_of(id)
            .and_then(CartQuantity::decremented)
            .is_some()
    }

    /// Set a line's quantity. Out-of-range values are ignored (`Ok(false)`).
    ///
    /// # Errors
    ///
    /// Returns the request failure after the cart has been reloaded.
    pub async fn set_quantity(&self, id: CartItemId, quantity: i64) -> Result<bool, SyncError> {
        self.update(id, CartMutation::SetQuantity(quantity)).await
    }

    /// Add one to a line's quantity. A no-op at the maximum.
    ///
    /// # Errors
    ///
    /// Returns the request failure after the cart has been reloaded.
    pub async fn increment(&self, id: CartItemId) -> Result<bool, SyncError> {
        match self.quantity_of(id).and_then(CartQuantity::incremented) {
            Some(next) => self.set_quantity(id, i64::from(next.get())).await,
            None => Ok(false),
        }
    }

    /// Take one from a line's quantity. A no-op at the minimum.
    ///
    /// # Errors
    ///
    /// Returns the request failure after the cart has been reloaded.
    pub async fn decrement(&self, id: CartItemId) -> Result<bool, SyncError> {
        match self.quantity_of(id).and_then(CartQuantity::decremented) {
            Some(next) => self.set_quantity(id, i64::from(next.get())).await,
            None => Ok(false),
        }
    }

    /// Put a product in the cart, then reload it.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` for a quantity outside the allowed
    /// range, before any request, or the request failure.
    #[instrument(skip(self, line), fields(product_id = %line.product_id, size = %line.size))]
    pub async fn add(&self, line: AddToCart) -> Result<(), SyncError> {
        let quantity = CartQuantity::new(line.quantity)
            .map_err(|e| FieldErrors::single("quantity", e.to_string()))?;

        if let Err(e) = self.post_line(line, quantity).await {
            let err = SyncError::from(e);
            self.report(&err, "Failed to add item to cart. Please try again.");
            return Err(err);
        }

        info!(quantity = quantity.get(), "Added product to cart");
        self.emit(SyncEvent::Notice(Notice::success(
            "Product added to cart successfully!",
        )));
        self.load().await
    }

    async fn post_line(&self, line: AddToCart, quantity: CartQuantity) -> Result<(), ApiError> {
        let cart = self.api().user_cart(self.source().owner()).await?;
        let request = AddToCartRequest {
            cart_id: cart.id,
            product_id: line.product_id,
            size: line.size,
            quantity: quantity.get(),
            player: line.player,
            number: line.number,
        };
        self.api().add_to_cart(&request).await
    }

    /// Sum of unit price times quantity over the local cart.
    pub fn subtotal(&self) -> Price {
        self.with_items(|items| {
            items
                .iter()
                .map(|item| item.product.price.times(item.quantity))
                .sum()
        })
    }

    /// Number of units in the local cart.
    pub fn item_count(&self) -> u32 {
        self.with_items(|items| items.iter().map(|item| item.quantity).sum())
    }
}
