//! Integration tests for Shopfront.
//!
//! The tests drive a real [`Store`] (and [`AdminClient`]) end to end over a
//! [`ScriptedTransport`], so every scenario runs offline and deterministically.
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session` - forced logout and stored-session rehydration
//! - `tenant` - hostname resolution, themes and the render gate
//! - `cart` - cart and favorites through the store
//! - `orders` - order lifecycle and checkout
//! - `catalog` - product listing, staleness and caching

use std::sync::Arc;

use serde_json::{Value, json};
use shopfront_admin::AdminClient;
use shopfront_core::ProductId;
use shopfront_storefront::api::{Product, ScriptedTransport};
use shopfront_storefront::persistence::keys;
use shopfront_storefront::{Persistence, Store, StorefrontConfig};
use url::Url;

pub use reqwest::Method;

/// API base every scripted route is relative to.
pub const API_BASE: &str = "https://api.shop.test/api";

/// Base uploaded image paths resolve against.
pub const IMAGE_BASE: &str = "https://cdn.shop.test";

/// Hostname that resolves to the `acme` tenant.
pub const TENANT_HOST: &str = "acme.shop.test";

/// A store wired to a scripted API.
pub struct TestContext {
    pub store: Store,
    pub transport: Arc<ScriptedTransport>,
}

impl TestContext {
    /// Fresh store for `hostname` with in-memory persistence.
    #[must_use]
    pub fn new(hostname: &str) -> Self {
        Self::with_persistence(hostname, Persistence::in_memory())
    }

    /// Store over existing persistence, as after a restart.
    ///
    /// # Panics
    ///
    /// Panics if [`API_BASE`] does not parse.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn with_persistence(hostname: &str, persistence: Persistence) -> Self {
        let transport = ScriptedTransport::new();
        let config = StorefrontConfig::new(Url::parse(API_BASE).unwrap())
            .with_hostname(hostname)
            .with_image_base_url(IMAGE_BASE);
        let store = Store::new(&config, persistence, transport.clone());
        Self { store, transport }
    }

    /// Dashboard client sharing the store's API client.
    #[must_use]
    pub fn admin(&self) -> AdminClient {
        AdminClient::new(self.store.client().clone())
    }

    /// Script a successful tenant lookup whose brand selects `theme`.
    pub fn script_tenant(&self, theme: i64) {
        self.transport.respond(
            Method::GET,
            "/tenants/storefront",
            200,
            json!({ "data": { "id": 1, "name": "Acme", "domain": "acme", "brand": { "theme": theme } } }),
        );
    }

    /// Sign in as `role` through the login endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the scripted login is rejected.
    #[allow(clippy::unwrap_used)]
    pub async fn sign_in(&self, role: &str) {
        self.transport.respond(
            Method::POST,
            "/storefront/auth/login",
            200,
            json!({ "data": {
                "token": "tok",
                "user": { "id": "u1", "name": "Ada", "email": "ada@example.com", "role": role }
            } }),
        );
        self.store.login("ada@example.com", "secret").await.unwrap();
    }

    /// A product as the shop sees it: served by the detail endpoint and
    /// decoded by the API client, so its images are already resolved.
    ///
    /// # Panics
    ///
    /// Panics if the scripted detail request fails.
    pub async fn product(&self, id: &str, price: i64, stock: i64) -> Product {
        self.fetch_product(product_json(id, price, stock)).await
    }

    /// Serve `payload` from the detail endpoint and fetch it through the store.
    ///
    /// # Panics
    ///
    /// Panics if `payload` has no string `id` or the request fails.
    #[allow(clippy::unwrap_used)]
    pub async fn fetch_product(&self, payload: Value) -> Product {
        let id = payload["id"].as_str().unwrap().to_string();
        self.transport.respond(
            Method::GET,
            &format!("/storefront/products/{id}"),
            200,
            json!({ "data": payload }),
        );
        self.store.fetch_product_by_id(&ProductId::new(id)).await.unwrap()
    }

    /// Whether any auth key is still stored.
    #[must_use]
    pub fn has_stored_auth(&self) -> bool {
        let persistence = self.store.persistence();
        keys::AUTH.iter().any(|key| persistence.load_raw(key).is_some())
    }
}

/// Product payload as the API sends it.
#[must_use]
pub fn product_json(id: &str, price: i64, stock: i64) -> Value {
    json!({
        "id": id,
        "title": format!("Product {id}"),
        "slug": id,
        "price": price,
        "stock": stock,
        "brand": "Acme",
        "images": [format!("/uploads/{id}.jpg")]
    })
}
