//! Admin stock management.
//!
//! Besides the optimistic quantity edits shared with the other collections,
//! stock entries are created and edited through a [`StockForm`] that is
//! validated locally and checked against the stock already held for the
//! product before anything is written.

use std::ops::Deref;

use football_store_core::{InventoryId, Price, ProductId, Size, StockQuantity, StockStatus};
use tracing::{debug, info, instrument, warn};

use super::{CollectionItem, CollectionSource, CollectionSync, Notice, Route, SyncEvent};
use crate::api::types::{InventoryPayload, InventoryRow, Product, SizeStock};
use crate::api::{ApiClient, ApiError};
use crate::error::{FieldErrors, SyncError};
use crate::session::Session;

const DUPLICATE_SIZE: &str =
    "This size already exists for the selected product. Please edit the existing entry instead.";
const INVALID_PRODUCT: &str = "Invalid product selected";

impl CollectionItem for InventoryRow {
    type Id = InventoryId;

    fn id(&self) -> InventoryId {
        self.id
    }
}

/// Changes an admin can make to a stock row in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryMutation {
    SetQuantity(u32),
}

/// All stock rows, as a server collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventorySource;

impl CollectionSource for InventorySource {
    type Item = InventoryRow;
    type Mutation = InventoryMutation;

    const NAME: &'static str = "inventory";

    async fn fetch(&self, api: &ApiClient) -> Result<Vec<InventoryRow>, ApiError> {
        api.inventory().await
    }

    fn validate(&self, _item: &InventoryRow, _mutation: &InventoryMutation) -> bool {
        true
    }

    fn apply(&self, item: &mut InventoryRow, mutation: &InventoryMutation) {
        match mutation {
            InventoryMutation::SetQuantity(quantity) => item.quantity = *quantity,
        }
    }

    async fn push(
        &self,
        api: &ApiClient,
        item: &InventoryRow,
        _mutation: &InventoryMutation,
    ) -> Result<(), ApiError> {
        api.update_inventory(item.id, &InventoryPayload::from(item))
            .await
    }

    async fn delete(&self, api: &ApiClient, id: InventoryId) -> Result<(), ApiError> {
        api.delete_inventory(id).await
    }

    fn unauthorized_message(&self) -> &'static str {
        "Unauthorized. Please make sure you have admin privileges."
    }
}

// =============================================================================
// Form
// =============================================================================

/// Raw input of the add/edit stock dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockForm {
    pub product_id: String,
    pub size: Size,
    pub quantity: String,
}

/// A [`StockForm`] that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidStock {
    pub product_id: ProductId,
    pub size: Size,
    pub quantity: StockQuantity,
}

impl StockForm {
    /// Prefill the dialog from an existing row.
    #[must_use]
    pub fn from_row(row: &InventoryRow) -> Self {
        Self {
            product_id: row.product.id.to_string(),
            size: row.size,
            quantity: row.quantity.to_string(),
        }
    }

    /// Check every field, collecting one message per invalid field.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when any field is invalid.
    pub fn validate(&self) -> Result<ValidStock, FieldErrors> {
        let mut errors = FieldErrors::new();

        let product_id = if self.product_id.trim().is_empty() {
            errors.insert("productId", "Product selection is required");
            None
        } else if let Ok(id) = self.product_id.parse::<ProductId>() {
            Some(id)
        } else {
            errors.insert("productId", INVALID_PRODUCT);
            None
        };

        let quantity = StockQuantity::parse(&self.quantity)
            .map_err(|e| errors.insert("quantity", e.to_string()))
            .ok();

        match (product_id, quantity) {
            (Some(product_id), Some(quantity)) if errors.is_empty() => Ok(ValidStock {
                product_id,
                size: self.size,
                quantity,
            }),
            _ => Err(errors),
        }
    }
}

/// Summary figures shown above the stock table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InventoryStats {
    pub total_items: usize,
    /// Rows under the low-stock threshold, out-of-stock rows included.
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub total_value: Price,
}

impl InventoryStats {
    fn from_rows(rows: &[InventoryRow]) -> Self {
        rows.iter().fold(
            Self {
                total_items: rows.len(),
                ..Self::default()
            },
            |mut stats, row| {
                match StockStatus::for_quantity(row.quantity) {
                    StockStatus::OutOfStock => {
                        stats.out_of_stock += 1;
                        stats.low_stock += 1;
                    }
                    StockStatus::LowStock => stats.low_stock += 1,
                    StockStatus::InStock => {}
                }
                stats.total_value = stats.total_value + row.product.price.times(row.quantity);
                stats
            },
        )
    }
}

// =============================================================================
// InventorySync
// =============================================================================

/// Stock controller. Only admins can build one.
#[derive(Debug)]
pub struct InventorySync {
    inner: CollectionSync<InventorySource>,
}

impl Deref for InventorySync {
    type Target = CollectionSync<InventorySource>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl InventorySync {
    /// Stock controller for an admin session.
    ///
    /// # Errors
    ///
    /// Returns the route to send anyone else to.
    pub fn new(api: ApiClient, session: &Session) -> Result<Self, Route> {
        session.require_admin()?;
        Ok(Self {
            inner: CollectionSync::new(api, InventorySource),
        })
    }

    /// Change a row's quantity in place.
    ///
    /// # Errors
    ///
    /// Returns the request failure after the stock list has been reloaded.
    pub async fn set_quantity(&self, id: InventoryId, quantity: u32) -> Result<bool, SyncError> {
        self.update(id, InventoryMutation::SetQuantity(quantity))
            .await
    }

    /// Delete a row, confirming success with a notification.
    ///
    /// # Errors
    ///
    /// Returns the request failure after the stock list has been reloaded.
    pub async fn delete_row(&self, id: InventoryId) -> Result<bool, SyncError> {
        let removed = self.remove(id).await?;
        if removed {
            self.emit(SyncEvent::Notice(Notice::success(
                "Stock deleted successfully",
            )));
        }
        Ok(removed)
    }

    /// Create a stock row, or replace row `editing`, from dialog input.
    ///
    /// Nothing is sent when the form is invalid. A size already stocked for
    /// the product (other than the row being edited) is rejected before the
    /// write.
    ///
    /// # Errors
    ///
    /// - `SyncError::Validation` for invalid input
    /// - `SyncError::Conflict` for a duplicate size
    /// - `SyncError::NotFound` when the product is not in the catalog
    /// - the request failure otherwise
    #[instrument(skip(self, form), fields(size = %form.size, editing = ?editing))]
    pub async fn submit(
        &self,
        form: &StockForm,
        editing: Option<InventoryId>,
    ) -> Result<(), SyncError> {
        let stock = form.validate()?;

        if self.size_taken(&stock, editing).await {
            self.emit(SyncEvent::Notice(Notice::error(DUPLICATE_SIZE)));
            return Err(SyncError::Conflict(DUPLICATE_SIZE.to_string()));
        }

        let product = match self.resolve_product(stock.product_id).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                self.emit(SyncEvent::Notice(Notice::error(INVALID_PRODUCT)));
                return Err(SyncError::NotFound(INVALID_PRODUCT.to_string()));
            }
            Err(e) => {
                let err = SyncError::from(e);
                self.report(&err, "Failed to fetch products");
                return Err(err);
            }
        };

        let payload = InventoryPayload {
            product: &product,
            size: stock.size,
            quantity: stock.quantity.get(),
        };
        let result = match editing {
            Some(id) => self.api().update_inventory(id, &payload).await,
            None => self.api().create_inventory(&payload).await,
        };
        if let Err(e) = result {
            let err = SyncError::from(e);
            warn!(error = %err, "Stock write failed");
            self.report(&err, "Operation failed");
            return Err(err);
        }

        let message = if editing.is_some() {
            "Stock updated successfully"
        } else {
            "Stock added successfully"
        };
        info!(product_id = %stock.product_id, quantity = stock.quantity.get(), "{message}");
        self.emit(SyncEvent::Notice(Notice::success(message)));
        self.load().await
    }

    /// Look a product up in the catalog, refetching it once when the cached
    /// copy predates the product.
    async fn resolve_product(&self, id: ProductId) -> Result<Option<Product>, ApiError> {
        if let Some(product) = self.api().product(id).await? {
            return Ok(Some(product));
        }
        debug!(%id, "Product missing from cached catalog, refetching");
        self.api().invalidate_catalog().await;
        self.api().product(id).await
    }

    /// Whether the product already has stock in the form's size.
    ///
    /// A failed lookup counts as "not taken".
    async fn size_taken(&self, stock: &ValidStock, editing: Option<InventoryId>) -> bool {
        match self.api().inventory_for_product(stock.product_id).await {
            Ok(entries) => {
                let edited = editing.and_then(|id| self.get(id));
                entries.iter().any(|entry| {
                    entry.size == stock.size
                        && !is_edited_entry(entry, editing, edited.as_ref(), stock.product_id)
                })
            }
            Err(e) => {
                warn!(error = %e, "Duplicate size check failed, continuing");
                false
            }
        }
    }

    /// Rows whose product name contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<InventoryRow> {
        let query = query.to_lowercase();
        self.with_items(|rows| {
            rows.iter()
                .filter(|row| row.product.name.to_lowercase().contains(&query))
                .cloned()
                .collect()
        })
    }

    /// Figures over the local stock list.
    pub fn stats(&self) -> InventoryStats {
        self.with_items(InventoryStats::from_rows)
    }
}

/// Whether a precheck entry is the row being edited.
///
/// Entries without an id are matched against the locally held edited row.
fn is_edited_entry(
    entry: &SizeStock,
    editing: Option<InventoryId>,
    edited: Option<&InventoryRow>,
    product_id: ProductId,
) -> bool {
    match (entry.id, editing) {
        (Some(id), Some(editing)) => id == editing,
        (None, Some(_)) => edited.is_some_and(|row| {
            let same = row.product.id == product_id && row.size == entry.size;
            if same {
                debug!(row_id = %row.id, "Precheck entry is the edited row");
            }
            same
        }),
        (_, None) => false,
    }
}
