//! Catalog grid against the fake API: which fetches are required and which
//! only degrade the page.

#![allow(clippy::unwrap_used)]

use voltmart_core::ProductId;
use voltmart_integration_tests::FakeApi;
use voltmart_storefront::api::ApiError;
use voltmart_storefront::catalog::Catalog;

#[tokio::test]
async fn test_load_marks_cart_lines() {
    let api = FakeApi::start().await;
    api.seed_cart("u-asha", "p-buds", 1);
    let client = api.client_for("u-asha");
    let session = client.session().clone();
    let mut catalog = Catalog::new(client);

    catalog.load().await.unwrap();

    assert_eq!(catalog.page().products.len(), 12);
    assert_eq!(catalog.categories().len(), 3);
    let buds = catalog.product(&ProductId::new("p-buds")).unwrap();
    assert!(catalog.in_cart(buds));
    assert_eq!(session.cart_count(), 1);
}

#[tokio::test]
async fn test_category_failure_still_shows_products() {
    let api = FakeApi::start().await;
    api.fail_next("categories/getCategory", 500);
    let mut catalog = Catalog::new(api.client());

    catalog.load().await.unwrap();

    assert_eq!(catalog.page().products.len(), 12);
    assert_eq!(catalog.page().total_pages, 2);
    assert!(catalog.categories().is_empty());
    assert_eq!(api.count("getCategory"), 1);
}

#[tokio::test]
async fn test_product_failure_fails_the_grid() {
    let api = FakeApi::start().await;
    api.fail_next("products/getProduct", 500);
    let mut catalog = Catalog::new(api.client());

    let err = catalog.load().await.unwrap_err();

    assert!(matches!(err, ApiError::Api { status: 500, .. }));
    assert_eq!(api.count("getCategory"), 0);
}
