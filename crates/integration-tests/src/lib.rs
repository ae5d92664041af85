//! Integration tests for the Romanian Football Store client.
//!
//! Each test starts a `wiremock` server standing in for the backend and
//! drives the controllers through it, asserting on the requests the server
//! receives (`expect(n)` is checked when the server is dropped).
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p football-store-integration-tests
//! ```

use football_store_client::{ApiClient, ClientConfig, CurrentUser, Session};
use football_store_core::{Email, Role, UserId};
use serde_json::{Value, json};
use wiremock::MockServer;

/// Mock backend plus a client pointed at its `/api` root.
pub struct TestContext {
    pub server: MockServer,
    pub api: ApiClient,
}

impl TestContext {
    /// Start a mock backend and build a client for it.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[allow(clippy::unwrap_used)]
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let config = ClientConfig::new(&format!("{}/api", server.uri())).unwrap();
        let api = ApiClient::new(&config).unwrap();
        Self { server, api }
    }
}

/// A logged-in shopper with id 1.
///
/// # Panics
///
/// Never; the fixture email is valid.
#[allow(clippy::unwrap_used)]
#[must_use]
pub fn shopper() -> CurrentUser {
    CurrentUser {
        id: UserId::new(1),
        email: Email::parse("fan@example.ro").unwrap(),
        role: Role::User,
    }
}

/// A session for an admin with id 2.
///
/// # Panics
///
/// Never; the fixture email is valid.
#[allow(clippy::unwrap_used)]
#[must_use]
pub fn admin_session() -> Session {
    Session::authenticated(CurrentUser {
        id: UserId::new(2),
        email: Email::parse("admin@store.ro").unwrap(),
        role: Role::Admin,
    })
}

/// Product record as the backend serializes it.
#[must_use]
pub fn product_json(id: i32, name: &str, price: f64) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} jersey"),
        "price": price,
        "team": "FCSB",
        "photoUrl": format!("/images/{id}.jpg"),
        "licenced": true
    })
}

/// Cart line record.
#[must_use]
pub fn cart_item_json(id: i32, product: Value, size: &str, quantity: u32) -> Value {
    json!({
        "id": id,
        "product": product,
        "size": size,
        "quantity": quantity,
        "player": null,
        "number": null
    })
}

/// Wishlist entry record.
#[must_use]
pub fn wishlist_item_json(id: i32, product: Value) -> Value {
    json!({ "id": id, "product": product })
}

/// Inventory row record.
#[must_use]
pub fn inventory_row_json(id: i32, product: Value, size: &str, quantity: u32) -> Value {
    json!({
        "id": id,
        "product": product,
        "size": size,
        "quantity": quantity
    })
}
