//! Login, registration, profile, order history and session lifecycle.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use serde_json::json;
use voltmart_core::validation::RegistrationForm;
use voltmart_core::{OrderId, OrderStatus, UserRole};
use voltmart_integration_tests::{FakeApi, FakeOrder};
use voltmart_storefront::account::{Account, AccountError, Landing, ProfileForm};
use voltmart_storefront::api::ApiError;
use voltmart_storefront::session::keys;

fn seed_order(api: &FakeApi, id: &str, status: &str) {
    api.store().orders.push(FakeOrder {
        id: id.to_string(),
        number: 1001,
        user_id: "u-asha".to_string(),
        items: vec![("p-buds".to_string(), "Wireless earbuds".to_string(), 2)],
        total: Decimal::from(1000),
        address: json!({
            "street": "12 MG Road",
            "city": "Bengaluru",
            "state": "Karnataka",
            "postalCode": "560001",
        }),
        payment_method: "COD".to_string(),
        payment_id: None,
        status: status.to_string(),
    });
}

// =============================================================================
// Login and logout
// =============================================================================

#[tokio::test]
async fn test_customer_login_stores_session() {
    let api = FakeApi::start().await;
    let client = api.client();
    let session = client.session().clone();

    let landing = Account::new(client)
        .login("asha@voltmart.in", "Secret@123")
        .await
        .unwrap();

    assert_eq!(landing, Landing::Home);
    assert_eq!(session.get(keys::TOKEN).as_deref(), Some("tok-u-asha"));
    assert_eq!(session.get(keys::USER_ID).as_deref(), Some("u-asha"));
    assert_eq!(session.get(keys::NAME).as_deref(), Some("Asha Verma"));
    assert_eq!(session.get(keys::EMAIL).as_deref(), Some("asha@voltmart.in"));
    assert_eq!(session.get(keys::PHONE).as_deref(), Some("+919876543210"));
    assert_eq!(session.role(), UserRole::Customer);
    assert!(session.is_logged_in());
}

#[tokio::test]
async fn test_admin_login_lands_on_console() {
    let api = FakeApi::start().await;
    let client = api.client();
    let session = client.session().clone();

    let landing = Account::new(client)
        .login("admin@voltmart.in", "Admin@123")
        .await
        .unwrap();

    assert_eq!(landing, Landing::AdminConsole);
    assert_eq!(session.role(), UserRole::Admin);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let api = FakeApi::start().await;
    let client = api.client();
    let session = client.session().clone();

    let err = Account::new(client)
        .login("asha@voltmart.in", "nope")
        .await
        .unwrap_err();

    match err {
        AccountError::Api(ApiError::Rejected(message)) => {
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(session.token().is_none());
}

#[tokio::test]
async fn test_empty_credentials_send_nothing() {
    let api = FakeApi::start().await;

    let err = Account::new(api.client()).login("", "").await.unwrap_err();

    let AccountError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert_eq!(errors.len(), 2);
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_logout_clears_session() {
    let api = FakeApi::start().await;
    let client = api.client();
    let session = client.session().clone();
    let account = Account::new(client);
    account.login("asha@voltmart.in", "Secret@123").await.unwrap();
    session.set_cart_count(3).unwrap();

    account.logout().unwrap();

    for key in keys::AUTH_KEYS {
        assert!(session.get(key).is_none(), "{key} survived logout");
    }
    assert_eq!(session.cart_count(), 0);
    assert!(!session.is_logged_in());
}

// =============================================================================
// Registration
// =============================================================================

fn registration(email: &str) -> RegistrationForm {
    let mut form = RegistrationForm::new();
    form.name = "Kiran Rao".to_string();
    form.email = email.to_string();
    form.password = "kiran#42".to_string();
    form.gender = "male".to_string();
    assert!(form.set_mobile("+919812345678"));
    form
}

#[tokio::test]
async fn test_register_creates_user() {
    let api = FakeApi::start().await;

    Account::new(api.client())
        .register(&registration("kiran@voltmart.in"))
        .await
        .unwrap();

    let store = api.store();
    let user = store
        .users
        .iter()
        .find(|user| user.email == "kiran@voltmart.in")
        .unwrap();
    assert_eq!(user.name, "Kiran Rao");
    assert_eq!(user.mobile, "+919812345678");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let api = FakeApi::start().await;

    let err = Account::new(api.client())
        .register(&registration("asha@voltmart.in"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, AccountError::Api(ApiError::Rejected(ref message)) if message == "Email already registered")
    );
}

#[tokio::test]
async fn test_invalid_registration_sends_nothing() {
    let api = FakeApi::start().await;
    let mut form = registration("not-an-email");
    form.name = "R2D2".to_string();

    let err = Account::new(api.client()).register(&form).await.unwrap_err();

    let AccountError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert!(errors.get("email").is_some());
    assert!(errors.get("name").is_some());
    assert_eq!(api.count("addUser"), 0);
}

// =============================================================================
// Profile
// =============================================================================

#[tokio::test]
async fn test_profile_round_trip() {
    let api = FakeApi::start().await;
    let client = api.client_for("u-asha");
    let session = client.session().clone();
    let account = Account::new(client);

    let user = account.profile().await.unwrap();
    assert_eq!(user.name, "Asha Verma");

    let form = ProfileForm {
        name: "Asha V".to_string(),
        phone: "+919811112222".to_string(),
        ..ProfileForm::from(&user)
    };
    account.update_profile(&form).await.unwrap();

    let updated = account.profile().await.unwrap();
    assert_eq!(updated.name, "Asha V");
    assert_eq!(updated.mobile, "+919811112222");
    assert_eq!(session.get(keys::NAME).as_deref(), Some("Asha V"));
    assert_eq!(session.get(keys::PHONE).as_deref(), Some("+919811112222"));
}

#[tokio::test]
async fn test_profile_requires_session() {
    let api = FakeApi::start().await;

    let err = Account::new(api.client()).profile().await.unwrap_err();

    assert!(matches!(err, AccountError::Unauthenticated));
    assert!(api.requests().is_empty());
}

// =============================================================================
// Order history
// =============================================================================

#[tokio::test]
async fn test_cancel_pending_order() {
    let api = FakeApi::start().await;
    seed_order(&api, "o-1", "Pending");
    let account = Account::new(api.client_for("u-asha"));

    let mut history = account.my_orders().await.unwrap();
    assert_eq!(history.orders().len(), 1);
    let order = history.orders().first().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_price, Decimal::from(1000));

    let message = history.cancel(&OrderId::new("o-1")).await.unwrap();

    assert_eq!(message.as_deref(), Some("Order cancelled successfully"));
    assert!(history.orders().is_empty());
    assert_eq!(api.store().orders.first().unwrap().status, "Cancelled");
}

#[tokio::test]
async fn test_delivered_order_cannot_be_cancelled() {
    let api = FakeApi::start().await;
    seed_order(&api, "o-1", "Delivered");
    let account = Account::new(api.client_for("u-asha"));

    let mut history = account.my_orders().await.unwrap();
    let err = history.cancel(&OrderId::new("o-1")).await.unwrap_err();

    assert!(matches!(err, AccountError::NotCancellable { .. }));
    assert_eq!(api.count("cancelOrder"), 0);
    assert_eq!(history.orders().len(), 1);
}
