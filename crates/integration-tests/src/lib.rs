//! Integration tests for the Voltmart client.
//!
//! [`FakeApi`] is an in-process `axum` server speaking the remote API's JSON
//! shapes from an in-memory store. Every request is recorded so tests can
//! assert how many network calls an operation made.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p voltmart-integration-tests
//! ```
//!
//! # Fixtures
//!
//! - Categories `c-audio`, `c-phones`, `c-acc`
//! - Products `p-buds` (₹500), `p-phone` (₹49999) and twelve `p-cable-N` (₹199)
//! - Users `u-asha` (customer, `Secret@123`) and `u-admin` (admin, `Admin@123`)

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Multipart, Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Value, json};
use tokio::sync::Notify;
use voltmart_storefront::api::ApiClient;
use voltmart_storefront::config::StorefrontConfig;
use voltmart_storefront::session::{Scope, SessionStore, keys};

/// Timestamp stamped on every fake order.
pub const ORDER_CREATED_AT: &str = "2026-10-01T10:00:00Z";

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Clone)]
pub struct FakeCategory {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct FakeProduct {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub brand: String,
    pub image: bool,
}

#[derive(Debug, Clone)]
pub struct FakeUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub mobile: String,
    pub gender: String,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct FakeOrder {
    pub id: String,
    pub number: u64,
    pub user_id: String,
    /// `(product id, product name, quantity)`
    pub items: Vec<(String, String, i64)>,
    pub total: Decimal,
    pub address: Value,
    pub payment_method: String,
    pub payment_id: Option<String>,
    pub status: String,
}

/// Server-side state.
#[derive(Debug, Default)]
pub struct Store {
    pub categories: Vec<FakeCategory>,
    pub products: Vec<FakeProduct>,
    pub users: Vec<FakeUser>,
    /// Cart lines per user id: `(product id, quantity)`.
    pub carts: HashMap<String, Vec<(String, i64)>>,
    pub orders: Vec<FakeOrder>,
    /// `"METHOD /path"` of every request, in arrival order.
    pub requests: Vec<String>,
    failures: Vec<(String, u16)>,
    held: Option<String>,
    next_id: u64,
}

impl Store {
    fn seeded() -> Self {
        let category = |id: &str, name: &str, description: &str| FakeCategory {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        };
        let product = |id: &str, name: &str, price: i64, category: &str, brand: &str| FakeProduct {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{name} from {brand}"),
            price: Decimal::from(price),
            category: category.to_string(),
            brand: brand.to_string(),
            image: false,
        };

        let mut products = vec![
            product("p-buds", "Wireless earbuds", 500, "c-audio", "Voltmart"),
            product("p-phone", "Pixel 9", 49_999, "c-phones", "Google"),
        ];
        products.extend((1..=12).map(|n| {
            product(
                &format!("p-cable-{n}"),
                &format!("USB-C cable {n}m"),
                199,
                "c-acc",
                "Voltmart",
            )
        }));

        Self {
            categories: vec![
                category("c-audio", "Audio", "Headphones and speakers"),
                category("c-phones", "Smartphones", "Phones and wearables"),
                category("c-acc", "Accessories", "Cables, chargers and cases"),
            ],
            products,
            users: vec![
                FakeUser {
                    id: "u-asha".to_string(),
                    name: "Asha Verma".to_string(),
                    email: "asha@voltmart.in".to_string(),
                    password: "Secret@123".to_string(),
                    mobile: "+919876543210".to_string(),
                    gender: "Female".to_string(),
                    role: "user".to_string(),
                },
                FakeUser {
                    id: "u-admin".to_string(),
                    name: "Ravi Admin".to_string(),
                    email: "admin@voltmart.in".to_string(),
                    password: "Admin@123".to_string(),
                    mobile: "+919000000001".to_string(),
                    gender: "Male".to_string(),
                    role: "admin".to_string(),
                },
            ],
            ..Self::default()
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn product_json(&self, product: &FakeProduct) -> Value {
        let category = self
            .categories
            .iter()
            .find(|category| category.id == product.category)
            .map_or_else(
                || json!(product.category),
                |category| json!({"_id": category.id, "category_name": category.name}),
            );
        json!({
            "_id": product.id,
            "product_name": product.name,
            "product_description": product.description,
            "product_price": product.price.to_string(),
            "product_category": category,
            "product_brand": product.brand,
            "product_image": if product.image { format!("/uploads/{}.png", product.id) } else { String::new() },
        })
    }

    fn category_json(category: &FakeCategory) -> Value {
        json!({
            "_id": category.id,
            "category_name": category.name,
            "category_description": category.description,
        })
    }

    fn user_json(user: &FakeUser) -> Value {
        json!({
            "_id": user.id,
            "user_name": user.name,
            "user_email": user.email,
            "user_mobile": user.mobile,
            "user_gender": user.gender,
            "user_role": user.role,
        })
    }

    fn order_json(&self, order: &FakeOrder) -> Value {
        let user_name = self
            .users
            .iter()
            .find(|user| user.id == order.user_id)
            .map(|user| user.name.clone());
        let items: Vec<Value> = order
            .items
            .iter()
            .map(|(id, name, quantity)| {
                json!({
                    "productId": {"_id": id, "product_name": name},
                    "productName": name,
                    "quantity": quantity,
                })
            })
            .collect();
        let payment_info = order.payment_id.as_ref().map_or_else(
            || json!({}),
            |id| json!({"paymentId": id, "status": "Completed"}),
        );
        json!({
            "_id": order.id,
            "orderId": order.number,
            "userId": {"_id": order.user_id, "user_name": user_name},
            "items": items,
            "totalPrice": order.total.to_string(),
            "address": order.address,
            "paymentMethod": order.payment_method,
            "paymentInfo": payment_info,
            "status": order.status,
            "createdAt": ORDER_CREATED_AT,
        })
    }
}

// =============================================================================
// Server handle
// =============================================================================

/// Running fake API. Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct FakeApi {
    store: Arc<Mutex<Store>>,
    release: Arc<Notify>,
    base_url: String,
}

impl FakeApi {
    /// Bind to an ephemeral port on 127.0.0.1 and serve the seeded store.
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake API");
        let addr = listener.local_addr().expect("Failed to read local address");

        let api = Self {
            store: Arc::new(Mutex::new(Store::seeded())),
            release: Arc::new(Notify::new()),
            base_url: format!("http://{addr}"),
        };

        let app = router(api.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake API stopped");
        });
        api
    }

    /// Lock the server-side state.
    pub fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Client configuration pointing at this server.
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig::for_base_url(&self.base_url).expect("Invalid fake API URL")
    }

    /// Client with an empty in-memory session.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config(), SessionStore::in_memory()).expect("Failed to build client")
    }

    /// Client whose session already holds `user_id` and its token.
    pub fn client_for(&self, user_id: &str) -> ApiClient {
        let session = SessionStore::in_memory();
        session
            .set(keys::USER_ID, user_id, Scope::Persistent)
            .expect("Failed to store user id");
        session
            .set(keys::TOKEN, &format!("tok-{user_id}"), Scope::Persistent)
            .expect("Failed to store token");
        ApiClient::new(&self.config(), session).expect("Failed to build client")
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.store().requests.clone()
    }

    /// Number of requests whose `"METHOD /path"` contains `fragment`.
    pub fn count(&self, fragment: &str) -> usize {
        self.store()
            .requests
            .iter()
            .filter(|line| line.contains(fragment))
            .count()
    }

    /// Answer the next request matching `fragment` with `status`.
    pub fn fail_next(&self, fragment: &str, status: u16) {
        self.store().failures.push((fragment.to_string(), status));
    }

    /// Park requests matching `fragment` until [`Self::release`] is called.
    pub fn hold(&self, fragment: &str) {
        self.store().held = Some(fragment.to_string());
    }

    /// Let one parked request through.
    pub fn release(&self) {
        self.release.notify_one();
    }

    /// Put a line in a user's server-side cart.
    pub fn seed_cart(&self, user_id: &str, product_id: &str, quantity: i64) {
        self.store()
            .carts
            .entry(user_id.to_string())
            .or_default()
            .push((product_id.to_string(), quantity));
    }

    /// Server-side quantity of a cart line.
    pub fn cart_quantity(&self, user_id: &str, product_id: &str) -> Option<i64> {
        self.store()
            .carts
            .get(user_id)?
            .iter()
            .find(|(id, _)| id == product_id)
            .map(|(_, quantity)| *quantity)
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(api: FakeApi) -> Router {
    Router::new()
        // Products
        .route("/api/products/getProduct", get(list_products))
        .route("/api/products/getProductById/{id}", get(get_product))
        .route("/api/products/addProduct", post(add_product))
        .route("/api/products/editProduct/{id}", put(edit_product))
        .route("/api/products/deleteProduct/{id}", delete(delete_product))
        .route("/api/products/totalProducts", get(total_products))
        // Categories
        .route("/api/categories/getCategory", get(list_categories))
        .route("/api/categories/singleCategory/{id}", get(get_category))
        .route("/api/categories/addCategory", post(add_category))
        .route("/api/categories/updateCategory/{id}", put(update_category))
        .route("/api/categories/deleteCategory/{id}", delete(delete_category))
        // Cart
        .route("/api/cart/getCart/{user_id}", get(get_cart))
        .route("/api/cart/addToCart", post(add_to_cart))
        .route("/api/cart/updateCart", put(update_cart))
        .route("/api/cart/removeFromCart", delete(remove_from_cart))
        // Orders
        .route("/api/orders/placeOrder", post(place_order))
        .route("/api/orders/getUserOrders/{user_id}", get(user_orders))
        .route("/api/orders/allOrders", get(all_orders))
        .route("/api/orders/recentOrders", get(recent_orders))
        .route("/api/orders/totalOrders", get(total_orders))
        .route("/api/orders/pendingOrders", get(pending_orders))
        .route("/api/orders/updateOrderStatus/{id}", put(update_order_status))
        .route("/api/orders/cancelOrder/{id}", delete(cancel_order))
        // Payments
        .route("/api/payment/razorpay", post(create_payment_order))
        // Users
        .route("/api/login", post(login))
        .route("/api/addUser", post(register))
        .route("/api/singleUser/{id}", get(get_user))
        .route("/api/updateUser/{id}", put(update_user))
        .route("/api/getUser", get(list_users))
        .route("/api/deleteUser/{id}", delete(delete_user))
        .route("/api/totalUsers", get(total_users))
        .layer(middleware::from_fn_with_state(api.clone(), record))
        .with_state(api)
}

/// Record the request, then apply injected failures and holds.
async fn record(State(api): State<FakeApi>, request: Request, next: Next) -> Response {
    let line = format!("{} {}", request.method(), request.uri().path());
    let (failure, held) = {
        let mut store = api.store();
        store.requests.push(line.clone());
        let failure = store
            .failures
            .iter()
            .position(|(fragment, _)| line.contains(fragment.as_str()))
            .map(|index| store.failures.remove(index));
        let held = store
            .held
            .as_deref()
            .is_some_and(|fragment| line.contains(fragment));
        (failure, held)
    };

    if let Some((_, status)) = failure {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Failure(status, "Injected failure").into_response();
    }
    if held {
        api.release.notified().await;
    }
    next.run(request).await
}

/// Error body in the server's `{ message }` shape.
struct Failure(StatusCode, &'static str);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.0, Json(json!({"message": self.1}))).into_response()
    }
}

type Reply = Result<Json<Value>, Failure>;

fn message(text: &str) -> Reply {
    Ok(Json(json!({"message": text})))
}

fn require_token(headers: &HeaderMap) -> Result<(), Failure> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .filter(|value| value.starts_with("Bearer tok-"))
        .map(drop)
        .ok_or(Failure(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

fn text(body: &Value, key: &str) -> String {
    body.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// -----------------------------------------------------------------------------
// Products
// -----------------------------------------------------------------------------

async fn list_products(State(api): State<FakeApi>) -> Reply {
    let store = api.store();
    let data: Vec<Value> = store
        .products
        .iter()
        .map(|product| store.product_json(product))
        .collect();
    Ok(Json(json!({"data": data})))
}

async fn get_product(State(api): State<FakeApi>, Path(id): Path<String>) -> Reply {
    let store = api.store();
    store
        .products
        .iter()
        .find(|product| product.id == id)
        .map(|product| Json(store.product_json(product)))
        .ok_or(Failure(StatusCode::NOT_FOUND, "Product not found"))
}

/// Text fields of a product form, plus whether an image was attached.
async fn product_fields(mut multipart: Multipart) -> (HashMap<String, String>, bool) {
    let mut fields = HashMap::new();
    let mut image = false;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "product_image" {
            image = field.bytes().await.is_ok_and(|bytes| !bytes.is_empty());
            continue;
        }
        fields.insert(name, field.text().await.unwrap_or_default());
    }
    (fields, image)
}

fn apply_product_fields(product: &mut FakeProduct, fields: &HashMap<String, String>, image: bool) {
    let get = |key: &str| fields.get(key).cloned().unwrap_or_default();
    product.name = get("product_name");
    product.description = get("product_description");
    product.price = get("product_price").parse().unwrap_or_default();
    product.category = get("product_category");
    product.brand = get("product_brand");
    product.image |= image;
}

async fn add_product(State(api): State<FakeApi>, multipart: Multipart) -> Reply {
    let (fields, image) = product_fields(multipart).await;
    let mut store = api.store();
    let mut product = FakeProduct {
        id: store.next_id("p"),
        name: String::new(),
        description: String::new(),
        price: Decimal::ZERO,
        category: String::new(),
        brand: String::new(),
        image: false,
    };
    apply_product_fields(&mut product, &fields, image);
    store.products.push(product);
    message("Product added successfully")
}

async fn edit_product(
    State(api): State<FakeApi>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Reply {
    let (fields, image) = product_fields(multipart).await;
    let mut store = api.store();
    let product = store
        .products
        .iter_mut()
        .find(|product| product.id == id)
        .ok_or(Failure(StatusCode::NOT_FOUND, "Product not found"))?;
    apply_product_fields(product, &fields, image);
    message("Product updated successfully")
}

async fn delete_product(State(api): State<FakeApi>, Path(id): Path<String>) -> Reply {
    let mut store = api.store();
    let before = store.products.len();
    store.products.retain(|product| product.id != id);
    if store.products.len() == before {
        return Err(Failure(StatusCode::NOT_FOUND, "Product not found"));
    }
    message("Product deleted successfully")
}

async fn total_products(State(api): State<FakeApi>) -> Reply {
    Ok(Json(json!({"totalProducts": api.store().products.len()})))
}

// -----------------------------------------------------------------------------
// Categories
// -----------------------------------------------------------------------------

async fn list_categories(State(api): State<FakeApi>) -> Reply {
    let data: Vec<Value> = api
        .store()
        .categories
        .iter()
        .map(Store::category_json)
        .collect();
    Ok(Json(json!({"data": data})))
}

async fn get_category(State(api): State<FakeApi>, Path(id): Path<String>) -> Reply {
    let data = api
        .store()
        .categories
        .iter()
        .find(|category| category.id == id)
        .map(Store::category_json);
    Ok(Json(json!({"data": data})))
}

async fn add_category(State(api): State<FakeApi>, Json(body): Json<Value>) -> Reply {
    let mut store = api.store();
    let category = FakeCategory {
        id: store.next_id("c"),
        name: text(&body, "category_name"),
        description: text(&body, "category_description"),
    };
    store.categories.push(category);
    message("Category added successfully")
}

async fn update_category(
    State(api): State<FakeApi>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut store = api.store();
    let category = store
        .categories
        .iter_mut()
        .find(|category| category.id == id)
        .ok_or(Failure(StatusCode::NOT_FOUND, "Category not found"))?;
    category.name = text(&body, "category_name");
    category.description = text(&body, "category_description");
    message("Category updated successfully")
}

async fn delete_category(State(api): State<FakeApi>, Path(id): Path<String>) -> Reply {
    let mut store = api.store();
    store.categories.retain(|category| category.id != id);
    message("Category deleted successfully")
}

// -----------------------------------------------------------------------------
// Cart
// -----------------------------------------------------------------------------

async fn get_cart(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Reply {
    require_token(&headers)?;
    let store = api.store();
    let Some(lines) = store.carts.get(&user_id) else {
        return Ok(Json(json!({"cart": null})));
    };
    let products: Vec<Value> = lines
        .iter()
        .map(|(product_id, quantity)| {
            let product = store
                .products
                .iter()
                .find(|product| &product.id == product_id)
                .map(|product| store.product_json(product));
            json!({"productId": product, "quantity": quantity})
        })
        .collect();
    Ok(Json(json!({"cart": {"userId": user_id, "products": products}})))
}

fn cart_request(body: &Value) -> (String, String, i64) {
    (
        text(body, "userId"),
        text(body, "productId"),
        body.get("quantity").and_then(Value::as_i64).unwrap_or(1),
    )
}

async fn add_to_cart(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    require_token(&headers)?;
    let (user_id, product_id, quantity) = cart_request(&body);
    let mut store = api.store();
    if !store.products.iter().any(|product| product.id == product_id) {
        return Err(Failure(StatusCode::NOT_FOUND, "Product not found"));
    }
    let lines = store.carts.entry(user_id).or_default();
    match lines.iter_mut().find(|(id, _)| *id == product_id) {
        Some((_, existing)) => *existing += quantity,
        None => lines.push((product_id, quantity)),
    }
    message("Product added to cart")
}

async fn update_cart(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    require_token(&headers)?;
    let (user_id, product_id, quantity) = cart_request(&body);
    let mut store = api.store();
    let line = store
        .carts
        .get_mut(&user_id)
        .and_then(|lines| lines.iter_mut().find(|(id, _)| *id == product_id))
        .ok_or(Failure(StatusCode::NOT_FOUND, "Product not in cart"))?;
    line.1 = quantity;
    message("Cart updated")
}

async fn remove_from_cart(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    require_token(&headers)?;
    let (user_id, product_id, _) = cart_request(&body);
    let mut store = api.store();
    if let Some(lines) = store.carts.get_mut(&user_id) {
        lines.retain(|(id, _)| *id != product_id);
    }
    message("Product removed from cart")
}

// -----------------------------------------------------------------------------
// Orders
// -----------------------------------------------------------------------------

async fn place_order(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    require_token(&headers)?;
    let user_id = text(&body, "userId");
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    (
                        text(item, "productId"),
                        text(item, "productName"),
                        item.get("quantity").and_then(Value::as_i64).unwrap_or(1),
                    )
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let total = body
        .get("totalPrice")
        .and_then(Value::as_f64)
        .and_then(|total| Decimal::try_from(total).ok())
        .unwrap_or_default()
        .round_dp(2);
    let payment_id = body
        .pointer("/paymentInfo/paymentId")
        .and_then(Value::as_str)
        .map(str::to_owned);

    let mut store = api.store();
    let id = store.next_id("o");
    let order = FakeOrder {
        id,
        number: 1000 + store.next_id,
        user_id: user_id.clone(),
        items,
        total,
        address: body.get("address").cloned().unwrap_or(Value::Null),
        payment_method: text(&body, "paymentMethod"),
        payment_id,
        status: "Pending".to_string(),
    };
    let order_json = store.order_json(&order);
    store.orders.push(order);
    store.carts.remove(&user_id);

    Ok(Json(json!({"message": "Order placed successfully", "order": order_json})))
}

fn orders_of(store: &Store, user_id: Option<&str>) -> Value {
    let orders: Vec<Value> = store
        .orders
        .iter()
        .filter(|order| user_id.is_none_or(|user_id| order.user_id == user_id))
        .map(|order| store.order_json(order))
        .collect();
    json!({"orders": orders})
}

async fn user_orders(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Reply {
    require_token(&headers)?;
    Ok(Json(orders_of(&api.store(), Some(&user_id))))
}

async fn all_orders(State(api): State<FakeApi>) -> Reply {
    Ok(Json(orders_of(&api.store(), None)))
}

async fn recent_orders(State(api): State<FakeApi>) -> Reply {
    let store = api.store();
    let orders: Vec<Value> = store
        .orders
        .iter()
        .rev()
        .take(5)
        .map(|order| {
            let username = store
                .users
                .iter()
                .find(|user| user.id == order.user_id)
                .map(|user| user.name.clone());
            json!({
                "orderId": order.number,
                "username": username,
                "totalPrice": order.total.to_string(),
                "status": order.status,
                "createdAt": ORDER_CREATED_AT,
            })
        })
        .collect();
    Ok(Json(json!({"orders": orders})))
}

async fn total_orders(State(api): State<FakeApi>) -> Reply {
    Ok(Json(json!({"totalOrders": api.store().orders.len()})))
}

async fn pending_orders(State(api): State<FakeApi>) -> Reply {
    let pending = api
        .store()
        .orders
        .iter()
        .filter(|order| order.status == "Pending")
        .count();
    Ok(Json(json!({"pendingOrders": pending})))
}

fn set_order_status(api: &FakeApi, id: &str, status: String) -> Result<(), Failure> {
    let mut store = api.store();
    let order = store
        .orders
        .iter_mut()
        .find(|order| order.id == id)
        .ok_or(Failure(StatusCode::NOT_FOUND, "Order not found"))?;
    order.status = status;
    Ok(())
}

async fn update_order_status(
    State(api): State<FakeApi>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    set_order_status(&api, &id, text(&body, "status"))?;
    message("Order status updated")
}

async fn cancel_order(State(api): State<FakeApi>, Path(id): Path<String>) -> Reply {
    set_order_status(&api, &id, "Cancelled".to_string())?;
    message("Order cancelled successfully")
}

// -----------------------------------------------------------------------------
// Payments
// -----------------------------------------------------------------------------

async fn create_payment_order(State(api): State<FakeApi>, Json(body): Json<Value>) -> Reply {
    let paise = body
        .get("amount")
        .and_then(Value::as_f64)
        .and_then(|amount| Decimal::try_from(amount).ok())
        .and_then(|amount| (amount * Decimal::ONE_HUNDRED).round().to_u64())
        .ok_or(Failure(StatusCode::BAD_REQUEST, "Invalid amount"))?;
    let id = api.store().next_id("order_rzp");
    Ok(Json(json!({"id": id, "amount": paise, "currency": "INR"})))
}

// -----------------------------------------------------------------------------
// Users
// -----------------------------------------------------------------------------

async fn login(State(api): State<FakeApi>, Json(body): Json<Value>) -> Response {
    let email = text(&body, "email");
    let password = text(&body, "password");
    let store = api.store();
    let Some(user) = store
        .users
        .iter()
        .find(|user| user.email == email && user.password == password)
    else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status": "fail", "Message": "Invalid email or password"})),
        )
            .into_response();
    };

    Json(json!({
        "status": "success",
        "token": format!("tok-{}", user.id),
        "data": {
            "user_id": user.id,
            "user_name": user.name,
            "user_email": user.email,
            "user_mobile": user.mobile,
            "user_gender": user.gender,
            "user_role": user.role,
        },
    }))
    .into_response()
}

async fn register(State(api): State<FakeApi>, Json(body): Json<Value>) -> Reply {
    let email = text(&body, "user_email");
    let mut store = api.store();
    if store.users.iter().any(|user| user.email == email) {
        return Ok(Json(json!({"status": 0, "message": "Email already registered"})));
    }
    let user = FakeUser {
        id: store.next_id("u"),
        name: text(&body, "user_name"),
        email,
        password: text(&body, "password"),
        mobile: text(&body, "user_mobile"),
        gender: text(&body, "user_gender"),
        role: "user".to_string(),
    };
    store.users.push(user);
    Ok(Json(json!({"status": 1, "message": "User registered successfully"})))
}

async fn get_user(State(api): State<FakeApi>, Path(id): Path<String>) -> Reply {
    let data = api
        .store()
        .users
        .iter()
        .find(|user| user.id == id)
        .map(Store::user_json);
    Ok(Json(json!({"data": data})))
}

async fn update_user(
    State(api): State<FakeApi>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut store = api.store();
    let user = store
        .users
        .iter_mut()
        .find(|user| user.id == id)
        .ok_or(Failure(StatusCode::NOT_FOUND, "User not found"))?;
    user.name = text(&body, "user_name");
    user.mobile = text(&body, "user_mobile");
    user.gender = text(&body, "user_gender");
    if let Some(email) = body.get("user_email").and_then(Value::as_str) {
        email.clone_into(&mut user.email);
    }
    message("User updated successfully")
}

async fn list_users(State(api): State<FakeApi>) -> Reply {
    let data: Vec<Value> = api.store().users.iter().map(Store::user_json).collect();
    Ok(Json(json!({"data": data})))
}

async fn delete_user(State(api): State<FakeApi>, Path(id): Path<String>) -> Reply {
    api.store().users.retain(|user| user.id != id);
    message("User deleted successfully")
}

async fn total_users(State(api): State<FakeApi>) -> Reply {
    Ok(Json(json!({"totalUsers": api.store().users.len()})))
}
