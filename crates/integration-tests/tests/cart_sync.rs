//! Cart controller against a mock backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use football_store_client::{AddToCart, CartMutation, CartSync, Notice, Route, SyncError, SyncEvent};
use football_store_core::{CartItemId, Price, ProductId, Size};
use football_store_integration_tests::{TestContext, cart_item_json, product_json, shopper};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

const ITEMS_PATH: &str = "/api/cart/user/1/items";

async fn mount_items(ctx: &TestContext, quantity: u32, expected_loads: u64) {
    Mock::given(method("GET"))
        .and(path(ITEMS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            cart_item_json(1, product_json(10, "FCSB Home 2024", 249.99), "M", quantity),
            cart_item_json(2, product_json(11, "Rapid Away", 150.0), "L", 1),
        ])))
        .expect(expected_loads)
        .mount(&ctx.server)
        .await;
}

#[tokio::test]
async fn test_failed_increment_rolls_back_to_server_quantity() {
    let ctx = TestContext::new().await;
    mount_items(&ctx, 3, 2).await;
    Mock::given(method("PUT"))
        .and(path("/api/cartItems/1"))
        .and(body_json(json!({"quantity": 4})))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let cart = CartSync::new(ctx.api.clone(), &shopper());
    cart.load().await.unwrap();
    let id = CartItemId::new(1);

    let pending = cart
        .apply_optimistic(id, CartMutation::SetQuantity(4))
        .unwrap();
    assert_eq!(cart.get(id).unwrap().quantity, 4);

    let err = cart.commit(pending).await.unwrap_err();
    assert!(matches!(err, SyncError::Operation(_)));
    assert_eq!(cart.get(id).unwrap().quantity, 3);
    assert_eq!(
        cart.take_events(),
        vec![SyncEvent::Notice(Notice::error("Failed to update cart item"))]
    );
}

#[tokio::test]
async fn test_increment_sends_new_quantity() {
    let ctx = TestContext::new().await;
    mount_items(&ctx, 3, 1).await;
    Mock::given(method("PUT"))
        .and(path("/api/cartItems/1"))
        .and(body_json(json!({"quantity": 4})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let cart = CartSync::new(ctx.api.clone(), &shopper());
    cart.load().await.unwrap();

    assert!(cart.increment(CartItemId::new(1)).await.unwrap());
    assert_eq!(cart.get(CartItemId::new(1)).unwrap().quantity, 4);
    assert_eq!(cart.item_count(), 5);
    assert_eq!(cart.subtotal(), Price::from_cents(24_999 * 4 + 15_000));
}

#[tokio::test]
async fn test_quantity_bounds_issue_no_request() {
    let ctx = TestContext::new().await;
    mount_items(&ctx, 10, 1).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let cart = CartSync::new(ctx.api.clone(), &shopper());
    cart.load().await.unwrap();
    let at_max = CartItemId::new(1);
    let at_min = CartItemId::new(2);

    assert!(!cart.can_increment(at_max));
    assert!(cart.can_decrement(at_max));
    assert!(!cart.increment(at_max).await.unwrap());
    assert!(!cart.can_decrement(at_min));
    assert!(!cart.decrement(at_min).await.unwrap());
    assert!(!cart.set_quantity(at_min, 0).await.unwrap());
    assert!(!cart.set_quantity(at_min, 11).await.unwrap());

    assert_eq!(cart.get(at_max).unwrap().quantity, 10);
    assert_eq!(cart.get(at_min).unwrap().quantity, 1);
    assert!(cart.take_events().is_empty());
}

#[tokio::test]
async fn test_stale_failure_leaves_newer_update_alone() {
    let ctx = TestContext::new().await;
    mount_items(&ctx, 3, 2).await;
    Mock::given(method("PUT"))
        .and(path("/api/cartItems/1"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&ctx.server)
        .await;

    let cart = CartSync::new(ctx.api.clone(), &shopper());
    cart.load().await.unwrap();
    let id = CartItemId::new(1);

    let first = cart
        .apply_optimistic(id, CartMutation::SetQuantity(4))
        .unwrap();
    let second = cart
        .apply_optimistic(id, CartMutation::SetQuantity(5))
        .unwrap();

    // superseded by `second`: reported, no refetch
    assert!(cart.commit(first).await.is_err());
    assert_eq!(cart.get(id).unwrap().quantity, 5);
    assert!(cart.take_events().is_empty());

    assert!(cart.commit(second).await.is_err());
    assert_eq!(cart.get(id).unwrap().quantity, 3);
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let ctx = TestContext::new().await;
    mount_items(&ctx, 3, 1).await;
    Mock::given(method("DELETE"))
        .and(path("/api/cartItems/2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let cart = CartSync::new(ctx.api.clone(), &shopper());
    cart.load().await.unwrap();

    assert!(cart.remove(CartItemId::new(2)).await.unwrap());
    assert!(!cart.remove(CartItemId::new(2)).await.unwrap());
    assert_eq!(cart.len(), 1);
}

#[tokio::test]
async fn test_add_posts_line_then_reloads() {
    let ctx = TestContext::new().await;
    mount_items(&ctx, 3, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/cart/user/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 77, "user": {"id": 1}})))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/add"))
        .and(body_json(json!({
            "cartId": 77,
            "productId": 10,
            "size": "XL",
            "quantity": 2,
            "player": "Hagi",
            "number": "10"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let cart = CartSync::new(ctx.api.clone(), &shopper());
    cart.add(AddToCart {
        product_id: ProductId::new(10),
        size: Size::XL,
        quantity: 2,
        player: Some("Hagi".to_string()),
        number: Some("10".to_string()),
    })
    .await
    .unwrap();

    assert_eq!(cart.len(), 2);
    assert_eq!(
        cart.take_events(),
        vec![SyncEvent::Notice(Notice::success(
            "Product added to cart successfully!"
        ))]
    );
}

#[tokio::test]
async fn test_expired_session_redirects_to_login() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path(ITEMS_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let cart = CartSync::new(ctx.api.clone(), &shopper());
    let err = cart.load().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(cart.is_empty());
    let events = cart.take_events();
    assert_eq!(
        events[0],
        SyncEvent::Notice(Notice::error(
            "Authentication required. Please log in again."
        ))
    );
    assert_eq!(events[1], SyncEvent::Redirect(Route::Login));
}

#[tokio::test]
async fn test_malformed_payload_is_a_parse_error() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path(ITEMS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "quantity": 2}])))
        .mount(&ctx.server)
        .await;

    let cart = CartSync::new(ctx.api.clone(), &shopper());
    assert!(matches!(
        cart.load().await.unwrap_err(),
        SyncError::Parse(_)
    ));
    assert!(!cart.is_loaded());
}
