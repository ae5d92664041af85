//! Wishlist endpoints.

use football_store_core::{ProductId, UserId, WishlistItemId};
use tracing::instrument;

use super::types::{AddToWishlistRequest, WishlistCheck, WishlistItem};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// List the products a user has saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn wishlist_items(&self, user_id: UserId) -> Result<Vec<WishlistItem>, ApiError> {
        self.get_json(&format!("wishlist/user/{user_id}/items")).await
    }

    /// Save a product to a user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_to_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        let request = AddToWishlistRequest {
            user_id,
            product_id,
        };
        self.post_json("wishlist/add", &request).await.map(|_| ())
    }

    /// Whether a product is on a user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn is_in_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, ApiError> {
        let check: WishlistCheck = self
            .get_json(&format!("wishlist/user/{user_id}/check/{product_id}"))
            .await?;
        Ok(check.in_wishlist)
    }

    /// Delete a wishlist entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn delete_wishlist_item(&self, id: WishlistItemId) -> Result<(), ApiError> {
        self.delete(&format!("wishlistItems/{id}")).await
    }
}
