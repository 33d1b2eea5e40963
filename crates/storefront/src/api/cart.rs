//! Server-side cart endpoints.

use reqwest::Method;
use tracing::instrument;
use voltmart_core::{ProductId, Quantity, UserId};

use super::wire::{CartEnvelope, CartItemRequest};
use super::{ApiClient, ApiError, CartLine};

impl ApiClient {
    /// Fetch the authoritative cart for `user_id`.
    ///
    /// Lines whose product has since been deleted are dropped.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or a line is malformed.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: &UserId) -> Result<Vec<CartLine>, ApiError> {
        let envelope: CartEnvelope = self.get(&["cart", "getCart", user_id.as_str()]).await?;
        envelope.into_lines()
    }

    /// Add `quantity` units of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<Option<String>, ApiError> {
        let body = CartItemRequest {
            user_id,
            product_id,
            quantity: Some(quantity),
        };
        self.acknowledge(Method::POST, &["cart", "addToCart"], Some(&body))
            .await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn update_cart(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<Option<String>, ApiError> {
        let body = CartItemRequest {
            user_id,
            product_id,
            quantity: Some(quantity),
        };
        self.acknowledge(Method::PUT, &["cart", "updateCart"], Some(&body))
            .await
    }

    /// Delete a cart line. The ids travel in the request body.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_from_cart(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<Option<String>, ApiError> {
        let body = CartItemRequest {
            user_id,
            product_id,
            quantity: None,
        };
        self.acknowledge(Method::DELETE, &["cart", "removeFromCart"], Some(&body))
            .await
    }
}
