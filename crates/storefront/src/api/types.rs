//! Domain types returned by the Remote Data Client.
//!
//! These are value snapshots of server-owned records. Wire shapes are kept
//! private in `wire`; everything here is already validated.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use voltmart_core::{
    CategoryId, Gender, OrderId, OrderStatus, PaymentMethod, Price, ProductId, Quantity, UserId,
    UserRole,
};

// =============================================================================
// Catalog
// =============================================================================

/// Category reference carried on a product.
///
/// The server stores either a bare reference string or a populated record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
    /// Unpopulated reference (id or name, as stored).
    Ref(String),
    /// Populated category.
    Named { id: CategoryId, name: String },
}

impl CategoryRef {
    /// Text to show for this category.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Ref(raw) => raw,
            Self::Named { name, .. } => name,
        }
    }

    /// Whether this reference points at `needle` (an id or a name).
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        match self {
            Self::Ref(raw) => raw == needle || raw.eq_ignore_ascii_case(needle),
            Self::Named { id, name } => id.as_str() == needle || name.eq_ignore_ascii_case(needle),
        }
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: Option<CategoryRef>,
    pub brand: String,
    /// Image URL or path as stored by the server.
    pub image: Option<String>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

/// Fields submitted when creating or editing a product.
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    /// Raw price input; validated as a positive number before submit.
    pub price: String,
    /// Category id.
    pub category: String,
    pub brand: String,
    /// Optional image upload.
    pub image: Option<ImageUpload>,
}

/// An image file to upload with a product.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// Cart
// =============================================================================

/// One line of the server-side cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: Quantity,
}

// =============================================================================
// Orders
// =============================================================================

/// Delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {} - {}",
            self.street, self.city, self.state, self.postal_code
        )
    }
}

/// A line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub product_id: Option<ProductId>,
    pub product_name: Option<String>,
    pub quantity: Quantity,
}

/// Who placed an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCustomer {
    pub id: UserId,
    pub name: Option<String>,
}

/// Online payment confirmation attached to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInfo {
    pub payment_id: String,
    pub status: String,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    /// Human-facing order number, when the server assigns one.
    pub number: Option<String>,
    pub customer: Option<OrderCustomer>,
    pub items: Vec<OrderItem>,
    pub total_price: Decimal,
    pub address: Option<Address>,
    pub payment_method: PaymentMethod,
    pub payment_info: Option<PaymentInfo>,
    pub status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
}

/// Summary row returned by the recent-orders endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentOrder {
    pub number: String,
    pub customer_name: String,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
}

/// Item submitted with a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: Quantity,
}

/// Order submission.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderLineRequest>,
    pub total_price: Decimal,
    pub address: Address,
    pub payment_method: PaymentMethod,
    /// Gateway payment id; present for online payments only.
    pub payment_id: Option<String>,
}

/// Server acknowledgement of a placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub message: Option<String>,
    pub order: Option<Order>,
}

// =============================================================================
// Users
// =============================================================================

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub gender: Option<Gender>,
    pub role: UserRole,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

/// Registration submission.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub gender: Gender,
    pub mobile: String,
}

/// Profile fields a user or admin may change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    #[serde(rename = "user_name")]
    pub name: String,
    #[serde(rename = "user_email", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "user_mobile")]
    pub mobile: String,
    #[serde(rename = "user_gender")]
    pub gender: String,
}

/// Admin dashboard counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_orders: u64,
    pub total_products: u64,
    pub pending_orders: u64,
    pub recent_orders: Vec<RecentOrder>,
}

// =============================================================================
// Payments
// =============================================================================

/// Gateway order created before an online payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOrder {
    /// Gateway order reference.
    pub id: String,
    /// Amount in minor units (paise).
    pub amount: u64,
    pub currency: String,
}
