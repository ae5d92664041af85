//! Checkout over the loaded cart: discount code, totals and order placement.

use football_store_core::{DiscountId, OrderId, Price};
use tracing::{debug, info, instrument, warn};

use super::{CartSync, Notice, SyncEvent};
use crate::api::types::{CouponCheck, CreateOrderRequest, OrderLineRequest};
use crate::error::{FieldErrors, SyncError};

const COUPON_FAILED: &str = "Error applying coupon. Please try again.";
const COUPON_INVALID: &str = "Invalid coupon code";

/// A discount code the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    pub id: DiscountId,
    pub code: String,
    /// Whole percent taken off the subtotal.
    pub percentage: u32,
}

impl Coupon {
    fn from_check(code: &str, check: CouponCheck) -> Result<Self, String> {
        match check {
            CouponCheck {
                valid: true,
                discount_id: Some(id),
                discount_percentage: Some(percentage),
                ..
            } => Ok(Self {
                id,
                code: code.to_string(),
                percentage,
            }),
            CouponCheck { message, .. } => Err(message.unwrap_or_else(|| COUPON_INVALID.into())),
        }
    }
}

/// Where the order is shipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingAddress {
    pub city: String,
    pub street: String,
    /// Street number.
    pub number: String,
    pub postal_code: String,
}

impl ShippingAddress {
    /// Check that every field is filled in.
    ///
    /// # Errors
    ///
    /// Returns the message for each blank field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let fields = [
            ("city", &self.city, "Please complete the city field"),
            ("street", &self.street, "Please complete the street field"),
            ("number", &self.number, "Please complete the street number field"),
            ("postalCode", &self.postal_code, "Please complete the postal code field"),
        ];
        for (field, value, message) in fields {
            if value.trim().is_empty() {
                errors.insert(field, message);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// An order the backend accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedOrder {
    pub id: OrderId,
    /// Amount charged, after the discount.
    pub total: Price,
}

/// Checkout screen state for one cart.
///
/// Totals follow the cart's local list, so they update with it.
#[derive(Debug)]
pub struct Checkout<'a> {
    cart: &'a CartSync,
    coupon: Option<Coupon>,
}

impl<'a> Checkout<'a> {
    #[must_use]
    pub const fn new(cart: &'a CartSync) -> Self {
        Self { cart, coupon: None }
    }

    /// The applied discount code, if any.
    #[must_use]
    pub const fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    pub fn clear_coupon(&mut self) {
        self.coupon = None;
    }

    pub fn subtotal(&self) -> Price {
        self.cart.subtotal()
    }

    /// Amount taken off by the applied coupon.
    pub fn discount(&self) -> Price {
        self.coupon
            .as_ref()
            .map_or(Price::ZERO, |coupon| self.subtotal().percent(coupon.percentage))
    }

    /// Amount to pay.
    pub fn total(&self) -> Price {
        self.subtotal() - self.discount()
    }

    /// Validate a discount code with the backend and apply it.
    ///
    /// A blank code is ignored (`Ok(false)`, no request). A rejected code
    /// removes any coupon applied before.
    ///
    /// # Errors
    ///
    /// - `SyncError::Validation` on the `coupon` field when the code is
    ///   rejected or cannot be checked
    /// - `SyncError::Unauthorized` when the session has expired
    #[instrument(skip(self))]
    pub async fn apply_coupon(&mut self, code: &str) -> Result<bool, SyncError> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(false);
        }
        self.coupon = None;

        let check = match self.cart.api().validate_coupon(code).await {
            Ok(check) => check,
            Err(e) => {
                let err = SyncError::from(e);
                warn!(error = %err, "Coupon check failed");
                if err.is_unauthorized() {
                    self.cart.report(&err, COUPON_FAILED);
                    return Err(err);
                }
                return Err(FieldErrors::single("coupon", COUPON_FAILED).into());
            }
        };

        let coupon = Coupon::from_check(code, check).map_err(|message| {
            debug!(%message, "Coupon rejected");
            FieldErrors::single("coupon", message)
        })?;

        info!(discount_id = %coupon.id, percentage = coupon.percentage, "Coupon applied");
        self.cart.emit(SyncEvent::Notice(Notice::success(format!(
            "Coupon applied successfully! {}% discount",
            coupon.percentage
        ))));
        self.coupon = Some(coupon);
        Ok(true)
    }

    /// Place an order for the cart's lines at the discounted total, then
    /// reload the cart.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` for a blank address field, before any
    /// request, or the request failure.
    #[instrument(skip(self, address))]
    pub async fn place_order(&self, address: &ShippingAddress) -> Result<PlacedOrder, SyncError> {
        address.validate()?;

        let total = self.total();
        let request = CreateOrderRequest {
            user_id: self.cart.source().owner(),
            discount_id: self.coupon.as_ref().map(|coupon| coupon.id),
            total_price: total,
            status: "pending",
            city: address.city.clone(),
            street: address.street.clone(),
            number: address.number.clone(),
            postal_code: address.postal_code.clone(),
            order_items: self
                .cart
                .with_items(|items| items.iter().map(OrderLineRequest::from).collect()),
        };

        let created = match self.cart.api().create_order(&request).await {
            Ok(created) => created,
            Err(e) => {
                let err = SyncError::from(e);
                warn!(error = %err, "Order creation failed");
                self.cart
                    .report(&err, "Failed to process order. Please try again.");
                return Err(err);
            }
        };

        info!(order_id = %created.id, %total, "Order placed");
        if let Err(e) = self.cart.load().await {
            debug!(error = %e, "Cart reload after order failed");
        }
        Ok(PlacedOrder {
            id: created.id,
            total,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn check(valid: bool, id: Option<i32>, percentage: Option<u32>) -> CouponCheck {
        CouponCheck {
            valid,
            discount_percentage: percentage,
            discount_id: id.map(DiscountId::new),
            message: None,
        }
    }

    #[test]
    fn test_coupon_needs_id_and_percentage() {
        let coupon = Coupon::from_check("HAGI10", check(true, Some(4), Some(10))).unwrap();
        assert_eq!(coupon.id, DiscountId::new(4));
        assert_eq!(coupon.percentage, 10);

        assert_eq!(
            Coupon::from_check("HAGI10", check(true, None, Some(10))).unwrap_err(),
            COUPON_INVALID
        );
        let mut inactive = check(false, None, None);
        inactive.message = Some("Coupon is not active".to_string());
        assert_eq!(
            Coupon::from_check("OLD", inactive).unwrap_err(),
            "Coupon is not active"
        );
    }

    #[test]
    fn test_address_reports_each_blank_field() {
        let errors = ShippingAddress {
            city: "Bucuresti".to_string(),
            street: "  ".to_string(),
            ..ShippingAddress::default()
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("city"), None);
        assert_eq!(errors.get("street"), Some("Please complete the street field"));
        assert_eq!(
            errors.get("postalCode"),
            Some("Please complete the postal code field")
        );
    }
}
