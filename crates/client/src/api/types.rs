//! Wire records exchanged with the store backend.
//!
//! Field names follow the backend's camelCase JSON. Optional product fields
//! default to `None` when absent; a missing required field fails the parse.

use football_store_core::{
    CartId, CartItemId, DiscountId, Email, InventoryId, OrderId, Price, ProductId, Role, Size,
    UserId, WishlistItemId,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// Records
// =============================================================================

/// A product as embedded in cart, wishlist and inventory records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licenced: Option<bool>,
}

/// A line in the shopper's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product: Product,
    pub size: Size,
    pub quantity: u32,
    /// Player name printed on the jersey.
    #[serde(default)]
    pub player: Option<String>,
    /// Shirt number printed on the jersey.
    #[serde(default)]
    pub number: Option<String>,
    /// Line total (unit price times quantity) as priced by the backend.
    #[serde(default)]
    pub price: Option<Price>,
}

/// A product saved to the shopper's wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub product: Product,
}

/// Stock held for one product in one size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub id: InventoryId,
    pub product: Product,
    pub size: Size,
    pub quantity: u32,
}

/// One entry of `GET /productInventory/product/{id}`.
///
/// The backend only reports size and quantity; `id` is kept optional so a
/// backend that does include it lets edits exclude their own row precisely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeStock {
    #[serde(default)]
    pub id: Option<InventoryId>,
    pub size: Size,
    pub quantity: u32,
}

/// The shopper's cart header (only the id is used).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Cart {
    pub id: CartId,
}

/// Response of `GET /auth/status`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
}

/// Response of `GET /discount/validate?code=`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponCheck {
    pub valid: bool,
    #[serde(default)]
    pub discount_percentage: Option<u32>,
    #[serde(default)]
    pub discount_id: Option<DiscountId>,
    /// Why the code was rejected.
    #[serde(default)]
    pub message: Option<String>,
}

/// The part of the created order the client keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CreatedOrder {
    pub id: OrderId,
}

/// Response of `GET /wishlist/user/{userId}/check/{productId}`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WishlistCheck {
    pub in_wishlist: bool,
}

// =============================================================================
// Request bodies
// =============================================================================

/// Body of `PUT /cartItems/{id}`.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// Body of `POST /cart/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub size: Size,
    pub quantity: u32,
    pub player: Option<String>,
    pub number: Option<String>,
}

/// Body of `POST /wishlist/add`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddToWishlistRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
}

/// Body of `POST /productInventory` and `PUT /productInventory/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryPayload<'a> {
    pub product: &'a Product,
    pub size: Size,
    pub quantity: u32,
}

impl<'a> From<&'a InventoryRow> for InventoryPayload<'a> {
    fn from(row: &'a InventoryRow) -> Self {
        Self {
            product: &row.product,
            size: row.size,
            quantity: row.quantity,
        }
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    pub discount_id: Option<DiscountId>,
    /// Total after the discount.
    pub total_price: Price,
    pub status: &'static str,
    pub city: String,
    pub street: String,
    pub number: String,
    pub postal_code: String,
    pub order_items: Vec<OrderLineRequest>,
}

/// One cart line copied into an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub size: Size,
    pub quantity: u32,
    pub player: Option<String>,
    pub number: Option<String>,
    pub price: Price,
}

impl From<&CartItem> for OrderLineRequest {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.id,
            size: item.size,
            quantity: item.quantity,
            player: item.player.clone(),
            number: item.number.clone(),
            price: item
                .price
                .unwrap_or_else(|| item.product.price.times(item.quantity)),
        }
    }
}

/// Body of `POST /auth/login`.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}
