//! Cart endpoints.

use football_store_core::{CartItemId, UserId};
use tracing::instrument;

use super::types::{AddToCartRequest, Cart, CartItem, UpdateQuantityRequest};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// List the lines of a user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn cart_items(&self, user_id: UserId) -> Result<Vec<CartItem>, ApiError> {
        self.get_json(&format!("cart/user/{user_id}/items")).await
    }

    /// Fetch the cart header of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user_cart(&self, user_id: UserId) -> Result<Cart, ApiError> {
        self.get_json(&format!("cart/user/{user_id}")).await
    }

    /// Add a product line to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(cart_id = %request.cart_id, product_id = %request.product_id))]
    pub async fn add_to_cart(&self, request: &AddToCartRequest) -> Result<(), ApiError> {
        self.post_json("cart/add", request).await.map(|_| ())
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn update_cart_item_quantity(
        &self,
        id: CartItemId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        self.put_json(
            &format!("cartItems/{id}"),
            &UpdateQuantityRequest { quantity },
        )
        .await
        .map(|_| ())
    }

    /// Delete a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn delete_cart_item(&self, id: CartItemId) -> Result<(), ApiError> {
        self.delete(&format!("cartItems/{id}")).await
    }
}
