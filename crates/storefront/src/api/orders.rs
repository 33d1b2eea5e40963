//! Order endpoints.

use reqwest::Method;
use tracing::instrument;
use voltmart_core::{OrderId, OrderStatus, PaymentMethod, UserId};

use super::wire::{
    OrderStatusRequest, OrderWire, OrdersEnvelope, PaymentInfoRequest, PendingOrders,
    PlaceOrderRequest, PlaceOrderResponse, RecentOrderWire, TotalOrders,
};
use super::{ApiClient, ApiError, NewOrder, Order, OrderConfirmation, RecentOrder};

/// Payment status reported for a completed online payment.
const PAYMENT_COMPLETED: &str = "Completed";

impl ApiClient {
    /// Submit an order. The server prices the order; `total_price` is informational.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(
        skip(self, order),
        fields(user_id = %order.user_id, items = order.items.len(), method = %order.payment_method)
    )]
    pub async fn place_order(&self, order: &NewOrder) -> Result<OrderConfirmation, ApiError> {
        let payment_info = match (order.payment_method, order.payment_id.as_deref()) {
            (PaymentMethod::Online, Some(payment_id)) => serde_json::to_value(PaymentInfoRequest {
                payment_id,
                status: PAYMENT_COMPLETED,
            })
            .map_err(|e| ApiError::Parse(e.to_string()))?,
            _ => serde_json::json!({}),
        };
        let body = PlaceOrderRequest {
            user_id: &order.user_id,
            items: &order.items,
            total_price: order.total_price,
            address: &order.address,
            payment_method: order.payment_method,
            payment_info,
        };

        let response: PlaceOrderResponse = self
            .send_json(Method::POST, &["orders", "placeOrder"], &body)
            .await?;
        Ok(OrderConfirmation {
            message: response.message,
            order: response.order.map(Order::try_from).transpose()?,
        })
    }

    /// Orders placed by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user_orders(&self, user_id: &UserId) -> Result<Vec<Order>, ApiError> {
        self.order_list(&["orders", "getUserOrders", user_id.as_str()])
            .await
    }

    /// Every order in the store.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn all_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.order_list(&["orders", "allOrders"]).await
    }

    /// Summary rows of the latest orders.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn recent_orders(&self) -> Result<Vec<RecentOrder>, ApiError> {
        let envelope: OrdersEnvelope<RecentOrderWire> =
            self.get(&["orders", "recentOrders"]).await?;
        Ok(envelope.orders.into_iter().map(RecentOrder::from).collect())
    }

    /// Number of orders.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn total_orders(&self) -> Result<u64, ApiError> {
        let total: TotalOrders = self.get(&["orders", "totalOrders"]).await?;
        Ok(total.total)
    }

    /// Number of orders still pending.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn pending_orders(&self) -> Result<u64, ApiError> {
        let pending: PendingOrders = self.get(&["orders", "pendingOrders"]).await?;
        Ok(pending.total)
    }

    /// Request a status transition. The server decides whether it is allowed.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Option<String>, ApiError> {
        self.acknowledge(
            Method::PUT,
            &["orders", "updateOrderStatus", id.as_str()],
            Some(&OrderStatusRequest { status }),
        )
        .await
    }

    /// Cancel an order.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel_order(&self, id: &OrderId) -> Result<Option<String>, ApiError> {
        self.acknowledge::<()>(Method::DELETE, &["orders", "cancelOrder", id.as_str()], None)
            .await
    }

    async fn order_list(&self, segments: &[&str]) -> Result<Vec<Order>, ApiError> {
        let envelope: OrdersEnvelope<OrderWire> = self.get(segments).await?;
        envelope.orders.into_iter().map(Order::try_from).collect()
    }
}
