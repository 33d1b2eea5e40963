//! Raw JSON shapes of the remote API and their conversion into domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use voltmart_core::{
    CategoryId, Gender, OrderId, OrderStatus, PaymentMethod, Price, ProductId, Quantity, UserId,
    UserRole,
};

use super::ApiError;
use super::types::{
    Address, CartLine, Category, CategoryRef, Order, OrderCustomer, OrderItem, OrderLineRequest,
    PaymentInfo, PaymentOrder, Product, RecentOrder, User,
};

// =============================================================================
// Envelopes
// =============================================================================

/// `{ data: T }`
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// `{ orders: [...] }`
#[derive(Debug, Deserialize)]
pub struct OrdersEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub orders: Vec<T>,
}

/// Acknowledgement body of mutating endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
}

// =============================================================================
// Products & categories
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CategoryRefWire {
    Populated {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        category_name: String,
    },
    Raw(String),
}

#[derive(Debug, Deserialize)]
pub struct ProductWire {
    #[serde(rename = "_id")]
    pub id: String,
    pub product_name: String,
    #[serde(default)]
    pub product_description: String,
    pub product_price: Decimal,
    #[serde(default)]
    pub product_category: Option<CategoryRefWire>,
    #[serde(default)]
    pub product_brand: String,
    #[serde(default)]
    pub product_image: Option<String>,
}

impl TryFrom<ProductWire> for Product {
    type Error = ApiError;

    fn try_from(wire: ProductWire) -> Result<Self, Self::Error> {
        let price = Price::inr(wire.product_price)
            .map_err(|e| ApiError::Parse(format!("product {}: {e}", wire.id)))?;
        let category = wire.product_category.and_then(|category| match category {
            CategoryRefWire::Populated { id, category_name } => Some(CategoryRef::Named {
                id: CategoryId::new(id),
                name: category_name,
            }),
            CategoryRefWire::Raw(raw) if raw.is_empty() => None,
            CategoryRefWire::Raw(raw) => Some(CategoryRef::Ref(raw)),
        });
        Ok(Self {
            id: ProductId::new(wire.id),
            name: wire.product_name,
            description: wire.product_description,
            price,
            category,
            brand: wire.product_brand,
            image: wire.product_image.filter(|image| !image.is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryWire {
    #[serde(rename = "_id")]
    pub id: String,
    pub category_name: String,
    #[serde(default)]
    pub category_description: String,
}

impl From<CategoryWire> for Category {
    fn from(wire: CategoryWire) -> Self {
        Self {
            id: CategoryId::new(wire.id),
            name: wire.category_name,
            description: wire.category_description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryRequest<'a> {
    pub category_name: &'a str,
    pub category_description: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TotalProducts {
    #[serde(rename = "totalProducts")]
    pub total: u64,
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CartEnvelope {
    #[serde(default)]
    pub cart: Option<CartWire>,
}

#[derive(Debug, Deserialize)]
pub struct CartWire {
    #[serde(default)]
    pub products: Vec<CartLineWire>,
}

#[derive(Debug, Deserialize)]
pub struct CartLineWire {
    /// Null when the product was deleted after being carted.
    #[serde(rename = "productId")]
    pub product: Option<ProductWire>,
    pub quantity: i64,
}

impl CartEnvelope {
    /// Convert to domain lines, skipping lines whose product no longer exists.
    pub fn into_lines(self) -> Result<Vec<CartLine>, ApiError> {
        let Some(cart) = self.cart else {
            return Ok(Vec::new());
        };
        let mut lines = Vec::with_capacity(cart.products.len());
        for line in cart.products {
            let Some(product) = line.product else {
                tracing::warn!("Skipping cart line for a deleted product");
                continue;
            };
            let quantity = Quantity::new(line.quantity)
                .map_err(|e| ApiError::Parse(format!("cart line {}: {e}", product.id)))?;
            lines.push(CartLine {
                product: product.try_into()?,
                quantity,
            });
        }
        Ok(lines)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest<'a> {
    pub user_id: &'a UserId,
    pub product_id: &'a ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserRefWire {
    Populated {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        user_name: Option<String>,
    },
    Id(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProductRefWire {
    Populated {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        product_name: Option<String>,
    },
    Id(String),
}

#[derive(Debug, Deserialize)]
pub struct OrderItemWire {
    #[serde(rename = "productId", default)]
    pub product: Option<ProductRefWire>,
    #[serde(rename = "productName", default)]
    pub product_name: Option<String>,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressWire {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfoWire {
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWire {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub order_id: Option<serde_json::Value>,
    #[serde(default)]
    pub user_id: Option<UserRefWire>,
    #[serde(default)]
    pub items: Vec<OrderItemWire>,
    pub total_price: Decimal,
    #[serde(default)]
    pub address: Option<AddressWire>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_info: Option<PaymentInfoWire>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Order numbers arrive as strings or numbers.
fn display_value(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_status(raw: Option<&str>, order: &str) -> OrderStatus {
    let Some(raw) = raw else {
        return OrderStatus::default();
    };
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(order, status = raw, "Unknown order status, treating as pending");
        OrderStatus::default()
    })
}

impl TryFrom<OrderWire> for Order {
    type Error = ApiError;

    fn try_from(wire: OrderWire) -> Result<Self, Self::Error> {
        let status = parse_status(wire.status.as_deref(), &wire.id);
        let payment_method = wire
            .payment_method
            .as_deref()
            .and_then(|method| method.parse().ok())
            .unwrap_or(PaymentMethod::Cod);

        let items = wire
            .items
            .into_iter()
            .map(|item| {
                let quantity = Quantity::new(item.quantity)
                    .map_err(|e| ApiError::Parse(format!("order {}: {e}", wire.id)))?;
                let (product_id, populated_name) = match item.product {
                    Some(ProductRefWire::Populated { id, product_name }) => {
                        (Some(ProductId::new(id)), product_name)
                    }
                    Some(ProductRefWire::Id(id)) => (Some(ProductId::new(id)), None),
                    None => (None, None),
                };
                Ok(OrderItem {
                    product_id,
                    product_name: item.product_name.or(populated_name),
                    quantity,
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        let customer = wire.user_id.map(|user| match user {
            UserRefWire::Populated { id, user_name } => OrderCustomer {
                id: UserId::new(id),
                name: user_name,
            },
            UserRefWire::Id(id) => OrderCustomer {
                id: UserId::new(id),
                name: None,
            },
        });

        let payment_info = wire.payment_info.and_then(|info| {
            Some(PaymentInfo {
                payment_id: info.payment_id.filter(|id| !id.is_empty())?,
                status: info.status.unwrap_or_default(),
            })
        });

        Ok(Self {
            id: OrderId::new(wire.id),
            number: wire.order_id.and_then(display_value),
            customer,
            items,
            total_price: wire.total_price,
            address: wire.address.map(|a| Address {
                street: a.street,
                city: a.city,
                state: a.state,
                postal_code: a.postal_code,
            }),
            payment_method,
            payment_info,
            status,
            created_at: wire.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrderWire {
    #[serde(default)]
    pub order_id: Option<serde_json::Value>,
    #[serde(default)]
    pub username: Option<String>,
    pub total_price: Decimal,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<RecentOrderWire> for RecentOrder {
    fn from(wire: RecentOrderWire) -> Self {
        let number = wire.order_id.and_then(display_value).unwrap_or_default();
        Self {
            status: parse_status(wire.status.as_deref(), &number),
            number,
            customer_name: wire.username.unwrap_or_else(|| "Unknown".to_string()),
            total_price: wire.total_price,
            created_at: wire.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfoRequest<'a> {
    pub payment_id: &'a str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest<'a> {
    pub user_id: &'a UserId,
    pub items: &'a [OrderLineRequest],
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub address: &'a Address,
    pub payment_method: PaymentMethod,
    /// Empty object for cash on delivery.
    pub payment_info: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderResponse {
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
    #[serde(default)]
    pub order: Option<OrderWire>,
}

#[derive(Debug, Serialize)]
pub struct OrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct TotalOrders {
    #[serde(rename = "totalOrders")]
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct PendingOrders {
    #[serde(rename = "pendingOrders")]
    pub total: u64,
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginUserWire {
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_mobile: String,
    #[serde(default)]
    pub user_gender: Option<String>,
    #[serde(default)]
    pub user_role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub data: Option<LoginUserWire>,
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
}

impl LoginResponse {
    /// Whether the server answered `status: "fail"`.
    pub fn is_failure(&self) -> bool {
        matches!(&self.status, Some(serde_json::Value::String(s)) if s.eq_ignore_ascii_case("fail"))
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub user_name: &'a str,
    pub user_email: &'a str,
    pub password: &'a str,
    pub user_gender: Gender,
    pub user_mobile: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
}

impl RegisterResponse {
    /// The server signals success with a numeric `status: 1`.
    pub fn is_success(&self) -> bool {
        self.status.as_ref().and_then(serde_json::Value::as_i64) == Some(1)
    }
}

#[derive(Debug, Deserialize)]
pub struct UserWire {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_mobile: String,
    #[serde(default)]
    pub user_gender: Option<String>,
    #[serde(default)]
    pub user_role: Option<String>,
}

fn parse_role(raw: Option<&str>) -> UserRole {
    raw.and_then(|role| role.parse().ok()).unwrap_or_default()
}

impl From<UserWire> for User {
    fn from(wire: UserWire) -> Self {
        Self {
            id: UserId::new(wire.id),
            name: wire.user_name,
            email: wire.user_email,
            mobile: wire.user_mobile,
            gender: wire.user_gender.and_then(|g| g.parse().ok()),
            role: parse_role(wire.user_role.as_deref()),
        }
    }
}

impl From<LoginUserWire> for User {
    fn from(wire: LoginUserWire) -> Self {
        Self {
            id: UserId::new(wire.user_id),
            name: wire.user_name,
            email: wire.user_email,
            mobile: wire.user_mobile,
            gender: wire.user_gender.and_then(|g| g.parse().ok()),
            role: parse_role(wire.user_role.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TotalUsers {
    #[serde(rename = "totalUsers")]
    pub total: u64,
}

// =============================================================================
// Payments
// =============================================================================

#[derive(Debug, Serialize)]
pub struct PaymentOrderRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct PaymentOrderWire {
    pub id: String,
    pub amount: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

impl From<PaymentOrderWire> for PaymentOrder {
    fn from(wire: PaymentOrderWire) -> Self {
        Self {
            id: wire.id,
            amount: wire.amount,
            currency: wire.currency,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_product_with_populated_category() {
        let wire: ProductWire = serde_json::from_value(json!({
            "_id": "p1",
            "product_name": "Pixel 9",
            "product_description": "Phone",
            "product_price": "49999.00",
            "product_category": {"_id": "c1", "category_name": "Smartphones"},
            "product_brand": "Google",
            "product_image": ""
        }))
        .unwrap();
        let product = Product::try_from(wire).unwrap();
        assert_eq!(product.price.amount(), Decimal::new(4_999_900, 2));
        assert!(product.category.as_ref().unwrap().matches("c1"));
        assert!(product.category.as_ref().unwrap().matches("smartphones"));
        assert_eq!(product.image, None);
    }

    #[test]
    fn test_negative_product_price_is_a_parse_error() {
        let wire: ProductWire = serde_json::from_value(json!({
            "_id": "p1", "product_name": "Broken", "product_price": -1
        }))
        .unwrap();
        assert!(matches!(Product::try_from(wire), Err(ApiError::Parse(_))));
    }

    #[test]
    fn test_cart_skips_deleted_products() {
        let envelope: CartEnvelope = serde_json::from_value(json!({
            "cart": {"products": [
                {"productId": null, "quantity": 1},
                {"productId": {"_id": "p2", "product_name": "Buds", "product_price": 500}, "quantity": 2}
            ]}
        }))
        .unwrap();
        let lines = envelope.into_lines().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity.get(), 2);
    }

    #[test]
    fn test_missing_cart_is_empty() {
        let envelope: CartEnvelope = serde_json::from_value(json!({})).unwrap();
        assert!(envelope.into_lines().unwrap().is_empty());
    }

    #[test]
    fn test_order_with_populated_refs() {
        let wire: OrderWire = serde_json::from_value(json!({
            "_id": "o1",
            "orderId": 1042,
            "userId": {"_id": "u1", "user_name": "Asha"},
            "items": [{"productId": {"_id": "p1", "product_name": "TV"}, "quantity": 1}],
            "totalPrice": 1500,
            "address": {"street": "MG Road", "city": "Pune", "state": "MH", "postalCode": "411001"},
            "paymentMethod": "Online",
            "paymentInfo": {"paymentId": "pay_1", "status": "Completed"},
            "status": "Shipped",
            "createdAt": "2026-03-01T10:00:00Z"
        }))
        .unwrap();
        let order = Order::try_from(wire).unwrap();
        assert_eq!(order.number.as_deref(), Some("1042"));
        assert_eq!(order.customer.unwrap().name.as_deref(), Some("Asha"));
        assert_eq!(order.items[0].product_name.as_deref(), Some("TV"));
        assert_eq!(order.payment_method, PaymentMethod::Online);
        assert_eq!(order.payment_info.unwrap().payment_id, "pay_1");
        assert_eq!(order.status, OrderStatus::Shipped);
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_cod_order_has_no_payment_info() {
        let wire: OrderWire = serde_json::from_value(json!({
            "_id": "o2", "userId": "u1", "items": [], "totalPrice": "999",
            "paymentMethod": "COD", "paymentInfo": {}, "status": "Pending"
        }))
        .unwrap();
        let order = Order::try_from(wire).unwrap();
        assert_eq!(order.payment_method, PaymentMethod::Cod);
        assert_eq!(order.payment_info, None);
        assert_eq!(order.customer.unwrap().id, UserId::new("u1"));
    }

    #[test]
    fn test_login_failure_flag() {
        let response: LoginResponse =
            serde_json::from_value(json!({"status": "fail", "Message": "Wrong password"})).unwrap();
        assert!(response.is_failure());
        assert_eq!(response.message.as_deref(), Some("Wrong password"));
    }

    #[test]
    fn test_register_status() {
        let ok: RegisterResponse = serde_json::from_value(json!({"status": 1})).unwrap();
        assert!(ok.is_success());
        let taken: RegisterResponse =
            serde_json::from_value(json!({"status": 0, "message": "Email exists"})).unwrap();
        assert!(!taken.is_success());
    }

    #[test]
    fn test_place_order_payload_shape() {
        let user = UserId::new("u1");
        let address = Address {
            street: "1 Main".into(),
            city: "Pune".into(),
            state: "MH".into(),
            postal_code: "411001".into(),
        };
        let request = PlaceOrderRequest {
            user_id: &user,
            items: &[],
            total_price: Decimal::new(150_050, 2),
            address: &address,
            payment_method: PaymentMethod::Cod,
            payment_info: json!({}),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["totalPrice"], json!(1500.5));
        assert_eq!(value["address"]["postalCode"], "411001");
        assert_eq!(value["paymentMethod"], "COD");
        assert_eq!(value["paymentInfo"], json!({}));
    }
}
