//! Wishlist controller against a mock backend.

#![allow(clippy::unwrap_used)]

use football_store_client::{Notice, SyncEvent, WishlistSync};
use football_store_core::{ProductId, WishlistItemId};
use football_store_integration_tests::{TestContext, product_json, shopper, wishlist_item_json};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

const ITEMS_PATH: &str = "/api/wishlist/user/1/items";

#[tokio::test]
async fn test_toggle_adds_missing_product() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path(ITEMS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path(ITEMS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([wishlist_item_json(8, product_json(4, "FCSB Away", 199.0))])),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/wishlist/add"))
        .and(body_json(json!({"userId": 1, "productId": 4})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let wishlist = WishlistSync::new(ctx.api.clone(), &shopper());
    assert!(wishlist.toggle(ProductId::new(4)).await.unwrap());

    assert_eq!(wishlist.entry_for(ProductId::new(4)), Some(WishlistItemId::new(8)));
    assert_eq!(
        wishlist.take_events(),
        vec![SyncEvent::Notice(Notice::success("Product added to wishlist"))]
    );
}

#[tokio::test]
async fn test_toggle_removes_saved_product() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path(ITEMS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([wishlist_item_json(8, product_json(4, "FCSB Away", 199.0))])),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/wishlistItems/8"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let wishlist = WishlistSync::new(ctx.api.clone(), &shopper());
    assert!(!wishlist.toggle(ProductId::new(4)).await.unwrap());

    assert!(!wishlist.contains_local(ProductId::new(4)));
    assert_eq!(
        wishlist.take_events(),
        vec![SyncEvent::Notice(Notice::success("Product removed from wishlist"))]
    );
}

#[tokio::test]
async fn test_failed_delete_restores_entry() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path(ITEMS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([wishlist_item_json(8, product_json(4, "FCSB Away", 199.0))])),
        )
        .expect(2)
        .mount(&ctx.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/wishlistItems/8"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let wishlist = WishlistSync::new(ctx.api.clone(), &shopper());
    wishlist.load().await.unwrap();

    assert!(wishlist.remove(WishlistItemId::new(8)).await.is_err());
    assert!(wishlist.contains_local(ProductId::new(4)));
}

#[tokio::test]
async fn test_contains_asks_server() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/wishlist/user/1/check/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"inWishlist": true})))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let wishlist = WishlistSync::new(ctx.api.clone(), &shopper());
    assert!(wishlist.contains(ProductId::new(4)).await.unwrap());
}
