//! Integration tests for optimistic cart state against a mock Storefront API.
//!
//! These exercise the full loop: local mutation, remote action, and
//! reconciliation of the authoritative server cart into the store.

use copihue_core::Money;
use copihue_integration_tests::mock::{MockShopify, VARIANT_PRICE};
use copihue_storefront::cart::actions::{self, CartActionError};
use copihue_storefront::cart::{CartStore, UpdateKind, sync};
use copihue_storefront::shopify::types::{Product, ProductVariant};

const VARIANT_ID: &str = "gid://shopify/ProductVariant/101";

fn sample_variant() -> ProductVariant {
    ProductVariant {
        id: VARIANT_ID.to_string(),
        title: "Tapa blanda".to_string(),
        price: Money::new(VARIANT_PRICE.to_string(), "CLP"),
        selected_options: Vec::new(),
    }
}

fn sample_product() -> Product {
    Product {
        id: "gid://shopify/Product/1".to_string(),
        handle: "el-libro-mock".to_string(),
        title: "El libro mock".to_string(),
        featured_image: None,
    }
}

// =============================================================================
// Reconciliation Tests
// =============================================================================

#[tokio::test]
async fn test_add_reconciles_local_state_with_the_server_cart() {
    let mock = MockShopify::start().await;
    let client = mock.storefront_client();

    let server_cart = actions::create_cart(&client).await.expect("create cart");
    let cart_id = server_cart.id.clone().expect("server cart id");
    let store = CartStore::new(Some(server_cart));

    sync::add_item(&store, &client, &cart_id, &sample_variant(), &sample_product())
        .await
        .expect("add");

    let cart = store.cart();
    // The local line now carries the server-assigned id.
    let line = cart.line_for_merchandise(VARIANT_ID).expect("line");
    assert!(line.id.is_some());
    assert_eq!(line.quantity, 1);
    assert_eq!(cart.total_quantity, 1);
    assert_eq!(cart.cost.total_amount.amount, "1000");
    assert_eq!(cart.cost.total_amount.currency_code, "CLP");
}

#[tokio::test]
async fn test_increment_and_remove_round_trip() {
    let mock = MockShopify::start().await;
    let client = mock.storefront_client();

    let server_cart = actions::create_cart(&client).await.expect("create cart");
    let cart_id = server_cart.id.clone().expect("server cart id");
    let store = CartStore::new(Some(server_cart));

    sync::add_item(&store, &client, &cart_id, &sample_variant(), &sample_product())
        .await
        .expect("add");
    sync::update_item(&store, &client, &cart_id, VARIANT_ID, UpdateKind::Increment)
        .await
        .expect("increment");

    let cart = store.cart();
    assert_eq!(cart.total_quantity, 2);
    assert_eq!(cart.cost.total_amount.amount, "2000");

    sync::update_item(&store, &client, &cart_id, VARIANT_ID, UpdateKind::Remove)
        .await
        .expect("remove");

    let cart = store.cart();
    assert!(cart.lines.is_empty());
    assert_eq!(cart.total_quantity, 0);
    assert_eq!(cart.cost.total_amount.amount, "0");
    // Tax comes back null from the API and is normalized to zero.
    assert_eq!(cart.cost.total_tax_amount.amount, "0");
}

#[tokio::test]
async fn test_decrement_to_zero_removes_the_server_line() {
    let mock = MockShopify::start().await;
    let client = mock.storefront_client();

    let server_cart = actions::create_cart(&client).await.expect("create cart");
    let cart_id = server_cart.id.clone().expect("server cart id");
    let store = CartStore::new(Some(server_cart));

    sync::add_item(&store, &client, &cart_id, &sample_variant(), &sample_product())
        .await
        .expect("add");
    sync::update_item(&store, &client, &cart_id, VARIANT_ID, UpdateKind::Decrement)
        .await
        .expect("decrement");

    assert!(store.cart().lines.is_empty());
    // The server agrees.
    let server_cart = client.get_cart(&cart_id).await.expect("get cart");
    assert!(server_cart.lines.is_empty());
}

// =============================================================================
// Divergence Tests
// =============================================================================

#[tokio::test]
async fn test_remote_failure_keeps_the_optimistic_state() {
    let mock = MockShopify::start().await;
    let client = mock.storefront_client();

    let server_cart = actions::create_cart(&client).await.expect("create cart");
    let cart_id = server_cart.id.clone().expect("server cart id");
    let store = CartStore::new(Some(server_cart));

    mock.state().storefront_unavailable = true;

    let result = sync::add_item(
        &store,
        &client,
        &cart_id,
        &sample_variant(),
        &sample_product(),
    )
    .await;

    assert!(matches!(result, Err(CartActionError::Remote(_))));

    // The shopper still sees the item; local and remote stay diverged until
    // the next successful sync.
    let cart = store.cart();
    assert_eq!(cart.total_quantity, 1);
    assert_eq!(cart.cost.total_amount.amount, "1000");

    mock.state().storefront_unavailable = false;
    let server_cart = client.get_cart(&cart_id).await.expect("get cart");
    assert!(server_cart.lines.is_empty());
}

#[tokio::test]
async fn test_subscribers_observe_the_optimistic_update_before_the_sync() {
    let mock = MockShopify::start().await;
    let client = mock.storefront_client();

    let server_cart = actions::create_cart(&client).await.expect("create cart");
    let cart_id = server_cart.id.clone().expect("server cart id");
    let store = CartStore::new(Some(server_cart));

    let mut rx = store.subscribe();
    rx.borrow_and_update();

    sync::add_item(&store, &client, &cart_id, &sample_variant(), &sample_product())
        .await
        .expect("add");

    // At least one snapshot was published, and the latest is the
    // reconciled server cart.
    assert!(rx.has_changed().expect("channel open"));
    let state = rx.borrow_and_update();
    assert_eq!(state.cart.total_quantity, 1);
    assert!(state.cart.line_for_merchandise(VARIANT_ID).is_some());
}

// =============================================================================
// Remote Action Edge Cases
// =============================================================================

#[tokio::test]
async fn test_removing_an_unknown_line_is_line_not_found() {
    let mock = MockShopify::start().await;
    let client = mock.storefront_client();

    let server_cart = actions::create_cart(&client).await.expect("create cart");
    let cart_id = server_cart.id.expect("server cart id");

    let result = actions::remove_item(&client, &cart_id, VARIANT_ID).await;

    assert!(matches!(
        result,
        Err(CartActionError::LineNotFound(ref id)) if id == VARIANT_ID
    ));
}

#[tokio::test]
async fn test_unknown_cart_id_is_cart_not_found() {
    let mock = MockShopify::start().await;
    let client = mock.storefront_client();

    actions::create_cart(&client).await.expect("create cart");

    let result =
        actions::update_item_quantity(&client, "gid://shopify/Cart/other", VARIANT_ID, 2).await;

    assert!(matches!(result, Err(CartActionError::CartNotFound)));
}

#[tokio::test]
async fn test_update_on_a_missing_line_adds_it_fresh() {
    let mock = MockShopify::start().await;
    let client = mock.storefront_client();

    let server_cart = actions::create_cart(&client).await.expect("create cart");
    let cart_id = server_cart.id.expect("server cart id");

    let cart = actions::update_item_quantity(&client, &cart_id, VARIANT_ID, 3)
        .await
        .expect("update");

    assert_eq!(cart.total_quantity, 3);
    assert_eq!(cart.cost.total_amount.amount, "3000");
}
