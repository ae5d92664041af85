//! Admin inventory endpoints.

use football_store_core::{InventoryId, ProductId};
use tracing::instrument;

use super::types::{InventoryPayload, InventoryRow, SizeStock};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// List every inventory row. Requires an admin session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for non-admin sessions.
    #[instrument(skip(self))]
    pub async fn inventory(&self) -> Result<Vec<InventoryRow>, ApiError> {
        self.get_json("productInventory").await
    }

    /// Sizes currently stocked for one product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn inventory_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<SizeStock>, ApiError> {
        self.get_json(&format!("productInventory/product/{product_id}"))
            .await
    }

    /// Create an inventory row.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, payload), fields(product_id = %payload.product.id, size = %payload.size))]
    pub async fn create_inventory(&self, payload: &InventoryPayload<'_>) -> Result<(), ApiError> {
        self.post_json("productInventory", payload).await.map(|_| ())
    }

    /// Replace an inventory row.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, payload), fields(row_id = %id, size = %payload.size))]
    pub async fn update_inventory(
        &self,
        id: InventoryId,
        payload: &InventoryPayload<'_>,
    ) -> Result<(), ApiError> {
        self.put_json(&format!("productInventory/{id}"), payload)
            .await
            .map(|_| ())
    }

    /// Delete an inventory row.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(row_id = %id))]
    pub async fn delete_inventory(&self, id: InventoryId) -> Result<(), ApiError> {
        self.delete(&format!("productInventory/{id}")).await
    }
}
