//! Discount codes and order placement.

use tracing::instrument;

use super::types::{CouponCheck, CreateOrderRequest, CreatedOrder};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Ask the backend whether a discount code can be used.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn validate_coupon(&self, code: &str) -> Result<CouponCheck, ApiError> {
        let mut url = self.url("discount/validate")?;
        url.query_pairs_mut().append_pair("code", code);
        self.get_url(url).await
    }

    /// Turn the user's cart into an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, total = %request.total_price))]
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<CreatedOrder, ApiError> {
        let body = self.post_json("orders", request).await?;
        Self::parse(&body)
    }
}
