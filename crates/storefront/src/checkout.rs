//! Checkout view model.
//!
//! A checkout is built from a cart snapshot or a single buy-now product. The
//! address is validated before any network call, so an online payment is
//! never collected for an order that would be refused locally.

use std::future::Future;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;
use voltmart_core::validation::{AddressField, FieldErrors};
use voltmart_core::{PaymentMethod, Quantity};

use crate::api::{
    Address, ApiClient, ApiError, CartLine, NewOrder, OrderConfirmation, OrderLineRequest,
    PaymentOrder, Product,
};
use crate::error::{ErrorKind, add_breadcrumb};

/// Errors raised while checking out.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("Your cart is empty")]
    EmptyCart,

    /// No user id in the session.
    #[error("Please log in to place an order")]
    Unauthenticated,

    /// One or more address fields are invalid.
    #[error("{0}")]
    InvalidAddress(FieldErrors),

    /// The payment gateway did not complete the payment.
    #[error("Payment failed: {0}")]
    Payment(String),

    /// The server refused or the request failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CheckoutError {
    /// Presentation category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyCart | Self::InvalidAddress(_) => ErrorKind::Validation,
            Self::Unauthenticated => ErrorKind::Authentication,
            Self::Payment(_) => ErrorKind::Api,
            Self::Api(e) => ErrorKind::of_api(e),
        }
    }
}

/// Proof of a completed gateway payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub payment_id: String,
}

/// Collects an online payment for a gateway order.
///
/// Stands in for the gateway's client SDK.
pub trait PaymentGateway: Send + Sync {
    /// Take payment for `order`.
    fn collect(
        &self,
        order: &PaymentOrder,
    ) -> impl Future<Output = Result<PaymentReceipt, CheckoutError>> + Send;
}

/// Gateway for payments already completed elsewhere; returns a known payment id.
#[derive(Debug, Clone)]
pub struct CollectedPayment {
    payment_id: String,
}

impl CollectedPayment {
    #[must_use]
    pub fn new(payment_id: impl Into<String>) -> Self {
        Self {
            payment_id: payment_id.into(),
        }
    }
}

impl PaymentGateway for CollectedPayment {
    async fn collect(&self, order: &PaymentOrder) -> Result<PaymentReceipt, CheckoutError> {
        if self.payment_id.trim().is_empty() {
            return Err(CheckoutError::Payment(format!(
                "no payment id for gateway order {}",
                order.id
            )));
        }
        Ok(PaymentReceipt {
            payment_id: self.payment_id.clone(),
        })
    }
}

/// Validate every address field.
///
/// # Errors
///
/// Returns the failing fields.
pub fn validate_address(address: &Address) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    for (field, value) in [
        (AddressField::Street, &address.street),
        (AddressField::City, &address.city),
        (AddressField::State, &address.state),
        (AddressField::PostalCode, &address.postal_code),
    ] {
        errors.record(field.key(), field.check(value));
    }
    errors.into_result()
}

/// Items about to be ordered.
#[derive(Debug, Clone)]
pub struct Checkout {
    api: ApiClient,
    lines: Vec<CartLine>,
}

impl Checkout {
    /// Check out a cart snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] when `lines` is empty.
    pub fn from_cart(api: ApiClient, lines: Vec<CartLine>) -> Result<Self, CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(Self { api, lines })
    }

    /// Check out one unit of a single product, bypassing the cart.
    #[must_use]
    pub fn buy_now(api: ApiClient, product: Product) -> Self {
        Self {
            api,
            lines: vec![CartLine {
                product,
                quantity: Quantity::ONE,
            }],
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Locally computed total. Informational; the server prices the order.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(|line| line.product.price.times(line.quantity))
            .sum()
    }

    /// Place a cash-on-delivery order.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidAddress`] or
    /// [`CheckoutError::Unauthenticated`] before any network call, or the
    /// API error.
    #[instrument(skip(self, address), fields(items = self.lines.len()))]
    pub async fn place_cod(&self, address: Address) -> Result<OrderConfirmation, CheckoutError> {
        let order = self.prepare(address, PaymentMethod::Cod)?;
        self.submit(order).await
    }

    /// Create a gateway order for the total, collect payment through
    /// `gateway`, then place the order with the payment id.
    ///
    /// # Errors
    ///
    /// Same local errors as [`Self::place_cod`], plus
    /// [`CheckoutError::Payment`] when the gateway fails. No order is placed
    /// unless payment succeeded.
    #[instrument(skip(self, address, gateway), fields(items = self.lines.len()))]
    pub async fn place_online(
        &self,
        address: Address,
        gateway: &impl PaymentGateway,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let mut order = self.prepare(address, PaymentMethod::Online)?;

        let payment_order = self.api.create_payment_order(order.total_price).await?;
        tracing::info!(
            gateway_order = %payment_order.id,
            amount = payment_order.amount,
            "Collecting payment"
        );
        let receipt = gateway.collect(&payment_order).await?;
        add_breadcrumb(
            "checkout",
            "Payment collected",
            Some(&[("payment_id", receipt.payment_id.as_str())]),
        );

        order.payment_id = Some(receipt.payment_id);
        self.submit(order).await
    }

    fn prepare(&self, address: Address, method: PaymentMethod) -> Result<NewOrder, CheckoutError> {
        validate_address(&address).map_err(CheckoutError::InvalidAddress)?;
        let user_id = self
            .api
            .session()
            .user_id()
            .ok_or(CheckoutError::Unauthenticated)?;

        let items = self
            .lines
            .iter()
            .map(|line| OrderLineRequest {
                product_id: line.product.id.clone(),
                product_name: line.product.name.clone(),
                price: line.product.price.amount(),
                quantity: line.quantity,
            })
            .collect();

        Ok(NewOrder {
            user_id,
            items,
            total_price: self.total(),
            address,
            payment_method: method,
            payment_id: None,
        })
    }

    async fn submit(&self, order: NewOrder) -> Result<OrderConfirmation, CheckoutError> {
        let confirmation = self.api.place_order(&order).await?;
        tracing::info!(
            order_id = ?confirmation.order.as_ref().map(|o| o.id.as_str()),
            "Order placed"
        );
        add_breadcrumb("checkout", "Order placed", None);
        Ok(confirmation)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use voltmart_core::{Price, ProductId};

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::session::SessionStore;

    fn api() -> ApiClient {
        let config = StorefrontConfig::for_base_url("http://127.0.0.1:9").unwrap();
        ApiClient::new(&config, SessionStore::in_memory()).unwrap()
    }

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::inr(Decimal::from(price)).unwrap(),
            category: None,
            brand: "Voltmart".to_string(),
            image: None,
        }
    }

    fn address() -> Address {
        Address {
            street: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            postal_code: "560001".to_string(),
        }
    }

    #[test]
    fn test_refuses_empty_cart() {
        assert!(matches!(
            Checkout::from_cart(api(), Vec::new()),
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[test]
    fn test_total() {
        let lines = vec![
            CartLine {
                product: product("a", 500),
                quantity: Quantity::new(2).unwrap(),
            },
            CartLine {
                product: product("b", 250),
                quantity: Quantity::ONE,
            },
        ];
        let checkout = Checkout::from_cart(api(), lines).unwrap();
        assert_eq!(checkout.total(), Decimal::from(1250));

        let single = Checkout::buy_now(api(), product("c", 799));
        assert_eq!(single.lines().len(), 1);
        assert_eq!(single.total(), Decimal::from(799));
    }

    #[test]
    fn test_address_validation() {
        assert!(validate_address(&address()).is_ok());

        let mut bad = address();
        bad.city.clear();
        bad.postal_code = "56A".to_string();
        let errors = validate_address(&bad).unwrap_err();
        assert_eq!(errors.get("city"), Some("Please fill in all address fields."));
        assert_eq!(errors.get("postalCode"), Some("Please enter a valid postal code."));
    }

    #[tokio::test]
    async fn test_invalid_address_fails_before_session_check() {
        let checkout = Checkout::buy_now(api(), product("c", 799));
        let result = checkout.place_cod(Address::default()).await;
        assert!(matches!(result, Err(CheckoutError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_cod_without_session() {
        let checkout = Checkout::buy_now(api(), product("c", 799));
        let result = checkout.place_cod(address()).await;
        assert!(matches!(result, Err(CheckoutError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_collected_payment_requires_id() {
        let order = PaymentOrder {
            id: "order_1".to_string(),
            amount: 79_900,
            currency: "INR".to_string(),
        };
        assert!(CollectedPayment::new("  ").collect(&order).await.is_err());
        assert_eq!(
            CollectedPayment::new("pay_1").collect(&order).await.unwrap(),
            PaymentReceipt {
                payment_id: "pay_1".to_string()
            }
        );
    }
}
