//! Payment gateway order creation.

use reqwest::Method;
use rust_decimal::Decimal;
use tracing::instrument;

use super::wire::{PaymentOrderRequest, PaymentOrderWire};
use super::{ApiClient, ApiError, PaymentOrder};

impl ApiClient {
    /// Create a gateway order for `amount` rupees.
    ///
    /// The server converts to minor units; the returned order carries the
    /// amount the gateway will charge.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(amount = %amount))]
    pub async fn create_payment_order(&self, amount: Decimal) -> Result<PaymentOrder, ApiError> {
        let wire: PaymentOrderWire = self
            .send_json(
                Method::POST,
                &["payment", "razorpay"],
                &PaymentOrderRequest { amount },
            )
            .await?;
        Ok(wire.into())
    }
}
