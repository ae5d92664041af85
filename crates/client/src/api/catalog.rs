//! Product catalog, cached in memory.

use std::sync::Arc;

use football_store_core::ProductId;
use tracing::{debug, instrument};

use super::types::Product;
use super::{ApiClient, ApiError};

const CATALOG_KEY: &str = "products";

impl ApiClient {
    /// All products, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog must be fetched and the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(products) = self.inner.catalog.get(CATALOG_KEY).await {
            debug!("Cache hit for product catalog");
            return Ok(products);
        }

        let products: Arc<Vec<Product>> = Arc::new(self.get_json("product").await?);

        self.inner
            .catalog
            .insert(CATALOG_KEY, Arc::clone(&products))
            .await;

        Ok(products)
    }

    /// Look up one product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be fetched.
    pub async fn product(&self, id: ProductId) -> Result<Option<Product>, ApiError> {
        Ok(self
            .products()
            .await?
            .iter()
            .find(|product| product.id == id)
            .cloned())
    }

    /// Drop the cached catalog so the next lookup refetches it.
    pub async fn invalidate_catalog(&self) {
        self.inner.catalog.invalidate(CATALOG_KEY).await;
    }
}
