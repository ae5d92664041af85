//! The shopper's wishlist.
//!
//! Wishlist entries have no editable attributes, so the mutation type is
//! uninhabited and only `load`, `remove` and `add` reach the server.

use std::convert::Infallible;
use std::ops::Deref;

use football_store_core::{ProductId, UserId, WishlistItemId};
use tracing::{info, instrument};

use super::{CollectionItem, CollectionSource, CollectionSync, Notice, SyncEvent};
use crate::api::types::WishlistItem;
use crate::api::{ApiClient, ApiError};
use crate::error::SyncError;
use crate::session::CurrentUser;

impl CollectionItem for WishlistItem {
    type Id = WishlistItemId;

    fn id(&self) -> WishlistItemId {
        self.id
    }
}

/// The wishlist of one user, as a server collection.
#[derive(Debug, Clone, Copy)]
pub struct WishlistSource {
    owner: UserId,
}

impl WishlistSource {
    #[must_use]
    pub const fn new(owner: UserId) -> Self {
        Self { owner }
    }

    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }
}

impl CollectionSource for WishlistSource {
    type Item = WishlistItem;
    type Mutation = Infallible;

    const NAME: &'static str = "wishlist";

    async fn fetch(&self, api: &ApiClient) -> Result<Vec<WishlistItem>, ApiError> {
        api.wishlist_items(self.owner).await
    }

    fn validate(&self, _item: &WishlistItem, mutation: &Infallible) -> bool {
        match *mutation {}
    }

    fn apply(&self, _item: &mut WishlistItem, mutation: &Infallible) {
        match *mutation {}
    }

    async fn push(
        &self,
        _api: &ApiClient,
        _item: &WishlistItem,
        mutation: &Infallible,
    ) -> Result<(), ApiError> {
        match *mutation {}
    }

    async fn delete(&self, api: &ApiClient, id: WishlistItemId) -> Result<(), ApiError> {
        api.delete_wishlist_item(id).await
    }
}

/// Wishlist controller for the logged-in shopper.
#[derive(Debug)]
pub struct WishlistSync {
    inner: CollectionSync<WishlistSource>,
}

impl Deref for WishlistSync {
    type Target = CollectionSync<WishlistSource>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl WishlistSync {
    /// Wishlist controller for `user`.
    #[must_use]
    pub fn new(api: ApiClient, user: &CurrentUser) -> Self {
        Self {
            inner: CollectionSync::new(api, WishlistSource::new(user.id)),
        }
    }

    /// The local entry saving `product_id`, if any.
    pub fn entry_for(&self, product_id: ProductId) -> Option<WishlistItemId> {
        self.with_items(|items| {
            items
                .iter()
                .find(|item| item.product.id == product_id)
                .map(|item| item.id)
        })
    }

    /// Whether `product_id` is in the local wishlist.
    pub fn contains_local(&self, product_id: ProductId) -> bool {
        self.entry_for(product_id).is_some()
    }

    /// Ask the server whether `product_id` is wishlisted.
    ///
    /// # Errors
    ///
    /// Returns the classified request failure.
    pub async fn contains(&self, product_id: ProductId) -> Result<bool, SyncError> {
        Ok(self
            .api()
            .is_in_wishlist(self.source().owner(), product_id)
            .await?)
    }

    /// Save a product to the wishlist, then reload it.
    ///
    /// # Errors
    ///
    /// Returns the classified request failure.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: ProductId) -> Result<(), SyncError> {
        if let Err(e) = self
            .api()
            .add_to_wishlist(self.source().owner(), product_id)
            .await
        {
            let err = SyncError::from(e);
            self.report(&err, "Failed to update wishlist. Please try again.");
            return Err(err);
        }

        info!("Added product to wishlist");
        self.emit(SyncEvent::Notice(Notice::success("Product added to wishlist")));
        self.load().await
    }

    /// Remove `product_id` when it is saved, otherwise save it.
    ///
    /// Returns whether the product is wishlisted afterwards.
    ///
    /// # Errors
    ///
    /// Returns the classified request failure.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn toggle(&self, product_id: ProductId) -> Result<bool, SyncError> {
        if !self.is_loaded() {
            self.load().await?;
        }

        match self.entry_for(product_id) {
            Some(id) => {
                if self.remove(id).await? {
                    self.emit(SyncEvent::Notice(Notice::success(
                        "Product removed from wishlist",
                    )));
                }
                Ok(false)
            }
            None => {
                self.add(product_id).await?;
                Ok(true)
            }
        }
    }
}
