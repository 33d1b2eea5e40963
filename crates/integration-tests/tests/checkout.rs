//! Checkout against the fake API: cash on delivery, online payment, and the
//! checks that run before anything is sent.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use voltmart_core::{OrderStatus, PaymentMethod, ProductId};
use voltmart_integration_tests::FakeApi;
use voltmart_storefront::api::Address;
use voltmart_storefront::cart::CartReconciler;
use voltmart_storefront::checkout::{Checkout, CheckoutError, CollectedPayment};

fn address() -> Address {
    Address {
        street: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        postal_code: "560001".to_string(),
    }
}

// =============================================================================
// Cash on delivery
// =============================================================================

#[tokio::test]
async fn test_cod_order_from_cart() {
    let api = FakeApi::start().await;
    api.seed_cart("u-asha", "p-buds", 2);
    api.seed_cart("u-asha", "p-phone", 1);
    let client = api.client_for("u-asha");
    let cart = CartReconciler::new(client.clone(), client.session().clone());
    cart.refresh().await.unwrap();

    let checkout = Checkout::from_cart(client, cart.snapshot()).unwrap();
    assert_eq!(checkout.total(), Decimal::from(50_999));

    let confirmation = checkout.place_cod(address()).await.unwrap();

    assert_eq!(confirmation.message.as_deref(), Some("Order placed successfully"));
    let order = confirmation.order.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_method, PaymentMethod::Cod);
    assert!(order.payment_info.is_none());
    assert_eq!(order.total_price, Decimal::from(50_999));
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.address, Some(address()));

    assert_eq!(api.count("payment/razorpay"), 0);
    let store = api.store();
    let placed = store.orders.first().unwrap();
    assert_eq!(placed.payment_method, "COD");
    assert!(placed.payment_id.is_none());
    assert!(!store.carts.contains_key("u-asha"));
}

#[tokio::test]
async fn test_empty_cart_cannot_check_out() {
    let api = FakeApi::start().await;
    let client = api.client_for("u-asha");
    let cart = CartReconciler::new(client.clone(), client.session().clone());
    cart.refresh().await.unwrap();

    let err = Checkout::from_cart(client, cart.snapshot()).unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
}

// =============================================================================
// Online payment
// =============================================================================

#[tokio::test]
async fn test_online_buy_now() {
    let api = FakeApi::start().await;
    let client = api.client_for("u-asha");
    let phone = client.get_product(&ProductId::new("p-phone")).await.unwrap();

    let confirmation = Checkout::buy_now(client, phone)
        .place_online(address(), &CollectedPayment::new("pay_Nf3x8"))
        .await
        .unwrap();

    let order = confirmation.order.unwrap();
    assert_eq!(order.payment_method, PaymentMethod::Online);
    assert_eq!(order.payment_info.unwrap().payment_id, "pay_Nf3x8");
    assert_eq!(order.total_price, Decimal::from(49_999));

    assert_eq!(api.count("payment/razorpay"), 1);
    let store = api.store();
    let placed = store.orders.first().unwrap();
    assert_eq!(placed.payment_method, "Online");
    assert_eq!(placed.payment_id.as_deref(), Some("pay_Nf3x8"));
    assert_eq!(placed.items, vec![("p-phone".to_string(), "Pixel 9".to_string(), 1)]);
}

#[tokio::test]
async fn test_failed_payment_places_no_order() {
    let api = FakeApi::start().await;
    let client = api.client_for("u-asha");
    let buds = client.get_product(&ProductId::new("p-buds")).await.unwrap();

    let err = Checkout::buy_now(client, buds)
        .place_online(address(), &CollectedPayment::new(""))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Payment(_)));
    assert_eq!(api.count("payment/razorpay"), 1);
    assert_eq!(api.count("placeOrder"), 0);
}

// =============================================================================
// Local checks
// =============================================================================

#[tokio::test]
async fn test_invalid_address_sends_nothing() {
    let api = FakeApi::start().await;
    let client = api.client_for("u-asha");
    let buds = client.get_product(&ProductId::new("p-buds")).await.unwrap();
    let bad = Address {
        postal_code: "56".to_string(),
        city: String::new(),
        ..address()
    };

    let err = Checkout::buy_now(client, buds)
        .place_online(bad, &CollectedPayment::new("pay_1"))
        .await
        .unwrap_err();

    let CheckoutError::InvalidAddress(errors) = err else {
        panic!("expected address errors");
    };
    assert!(errors.get("postalCode").is_some());
    assert!(errors.get("city").is_some());
    assert_eq!(api.count("payment/razorpay"), 0);
    assert_eq!(api.count("placeOrder"), 0);
}

#[tokio::test]
async fn test_checkout_requires_login() {
    let api = FakeApi::start().await;
    let client = api.client();
    let buds = client.get_product(&ProductId::new("p-buds")).await.unwrap();

    let err = Checkout::buy_now(client, buds)
        .place_cod(address())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Unauthenticated));
    assert_eq!(api.count("placeOrder"), 0);
}
