//! Remote REST API client.
//!
//! Every request goes through [`ApiClient::execute`], which attaches the
//! tenant and auth headers and runs the response interceptor. A 401 (or an
//! error body mentioning "unauthorized") from any endpoint triggers the same
//! forced logout: stored auth is purged and a [`SessionEvent::ForcedLogout`]
//! is broadcast for the store to apply.

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shopfront_core::{CategoryId, ImageResolver, OrderId, ProductId, UserId};
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};
use url::Url;

use super::ApiError;
use super::cache::{ProductCache, product_cache};
use super::conversions::{RawCategory, RawProduct, RawSubCategory};
use super::transport::{ApiRequest, HttpTransport, RequestBody};
use super::types::{
    Category, LoginRequest, LoginResponse, NewOrder, Order, Product, ProductFilter,
    RegisterRequest, SubCategory, Tenant,
};
use crate::error::clear_sentry_user;
use crate::persistence::Persistence;

const SESSION_CHANNEL_CAPACITY: usize = 16;

/// Where the user is sent after a forced logout.
pub const LOGOUT_REDIRECT: &str = "/";

/// Session-level notifications from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The API rejected the session; stored auth has been purged.
    ForcedLogout { redirect_to: String },
}

/// Whether a request carries the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Anonymous,
    Bearer,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST API.
///
/// Cheap to clone; all clones share the transport, cache and session channel.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    transport: Arc<dyn HttpTransport>,
    base_url: Url,
    tenant_domain: Option<String>,
    images: ImageResolver,
    persistence: Persistence,
    events: broadcast::Sender<SessionEvent>,
    products: ProductCache,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("tenant_domain", &self.inner.tenant_domain)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client.
    ///
    /// `tenant_domain` is sent as `x-tenant-domain` on storefront calls; pass
    /// `None` when the hostname carries no tenant.
    #[must_use]
    pub fn new(
        base_url: Url,
        tenant_domain: Option<String>,
        images: ImageResolver,
        persistence: Persistence,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let (events, _) = broadcast::channel(SESSION_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(ApiClientInner {
                transport,
                base_url,
                tenant_domain,
                images,
                persistence,
                events,
                products: product_cache(),
            }),
        }
    }

    /// Subscribe to session events (forced logout).
    #[must_use]
    pub fn subscribe_session(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// The shared image resolver.
    #[must_use]
    pub fn images(&self) -> &ImageResolver {
        &self.inner.images
    }

    #[must_use]
    pub fn persistence(&self) -> &Persistence {
        &self.inner.persistence
    }

    #[must_use]
    pub fn tenant_domain(&self) -> Option<&str> {
        self.inner.tenant_domain.as_deref()
    }

    /// Whether a bearer token is currently stored.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner.persistence.token().is_some()
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}{path}"))
            .map_err(|e| ApiError::Transport(format!("invalid URL for {path}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Send a request and return the decoded JSON body (`Null` when empty).
    ///
    /// # Errors
    ///
    /// - [`ApiError::MissingToken`] if `auth` is `Bearer` and no token is
    ///   stored; nothing is sent.
    /// - [`ApiError::Unauthorized`] after a forced logout.
    /// - [`ApiError::NotFound`] / [`ApiError::Server`] for other statuses.
    #[instrument(
        skip(self, query, body),
        fields(
            tenant = self.inner.tenant_domain.as_deref().unwrap_or(""),
            request_id = tracing::field::Empty
        )
    )]
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: RequestBody,
        auth: Auth,
    ) -> Result<Value, ApiError> {
        let mut headers = Vec::with_capacity(3);
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());
        headers.push(("x-request-id".to_string(), request_id));
        if let Some(domain) = &self.inner.tenant_domain {
            headers.push(("x-tenant-domain".to_string(), domain.clone()));
        }
        if auth == Auth::Bearer {
            let token = self
                .inner
                .persistence
                .token()
                .ok_or(ApiError::MissingToken)?;
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        let request = ApiRequest {
            method,
            url: self.url(path, query)?,
            headers,
            body,
        };
        let response = self.inner.transport.send(request).await?;

        if !response.is_success() {
            return Err(self.intercept(response.status, &response.body));
        }
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| {
            warn!(error = %e, "Response body is not valid JSON");
            ApiError::Parse(e)
        })
    }

    /// Map a non-success response to an error, running the forced logout on
    /// an auth failure.
    fn intercept(&self, status: u16, body: &str) -> ApiError {
        let message = error_message(body);
        let unauthorized = status == 401
            || message
                .as_deref()
                .is_some_and(|m| m.to_lowercase().contains("unauthorized"));

        if unauthorized {
            self.force_logout(status);
            return ApiError::Unauthorized(message.unwrap_or_else(|| "Unauthorized".to_string()));
        }

        debug!(status, message = message.as_deref().unwrap_or(""), "API returned an error");
        match status {
            404 => ApiError::NotFound(message),
            _ => ApiError::Server { status, message },
        }
    }

    fn force_logout(&self, status: u16) {
        warn!(status, "Session rejected by API, forcing logout");
        self.inner.persistence.purge_auth();
        clear_sentry_user();
        // No receivers just means nobody is listening yet.
        let _ = self.inner.events.send(SessionEvent::ForcedLogout {
            redirect_to: LOGOUT_REDIRECT.to_string(),
        });
    }

    /// Send a request and decode the unwrapped payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload does not match `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let value = self.execute(method, path, &[], body, auth).await?;
        Ok(serde_json::from_value(unwrap_envelope(value))?)
    }

    /// JSON body from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn json_body<T: Serialize + ?Sized>(value: &T) -> Result<RequestBody, ApiError> {
        Ok(RequestBody::Json(serde_json::to_value(value)?))
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List products, optionally filtered by category and subcategory.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn products(&self, filter: ProductFilter) -> Result<Vec<Product>, ApiError> {
        let value = self
            .execute(
                Method::GET,
                "/storefront/products",
                &filter.query(),
                RequestBody::Empty,
                Auth::Anonymous,
            )
            .await?;
        let images = self.images();
        Ok(decode_list::<RawProduct>(value)
            .into_iter()
            .filter_map(|raw| raw.into_product(images, None))
            .collect())
    }

    /// Fetch one product. Served from cache for a short window.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the API has no such product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        if let Some(product) = self.inner.products.get(id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let value = self
            .execute(
                Method::GET,
                &format!("/storefront/products/{id}"),
                &[],
                RequestBody::Empty,
                Auth::Anonymous,
            )
            .await?;
        let payload = unwrap_envelope(value);
        if payload.is_null() {
            return Err(ApiError::NotFound(Some(format!("Product not found: {id}"))));
        }
        let raw: RawProduct = serde_json::from_value(payload)?;
        let product = raw
            .into_product(self.images(), Some(id))
            .ok_or_else(|| ApiError::NotFound(Some(format!("Product not found: {id}"))))?;

        self.inner.products.insert(id.clone(), product.clone()).await;
        Ok(product)
    }

    /// Drop a cached product (after an admin write).
    pub async fn invalidate_product(&self, id: &ProductId) {
        self.inner.products.invalidate(id).await;
    }

    /// List categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let value = self
            .execute(
                Method::GET,
                "/storefront/categories",
                &[],
                RequestBody::Empty,
                Auth::Anonymous,
            )
            .await?;
        Ok(decode_list::<RawCategory>(value)
            .into_iter()
            .filter_map(RawCategory::into_category)
            .collect())
    }

    /// List subcategories, for one category or all of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn subcategories(
        &self,
        category: Option<CategoryId>,
    ) -> Result<Vec<SubCategory>, ApiError> {
        let query: Vec<(&str, String)> = category
            .map(|id| vec![("categoryId", id.to_string())])
            .unwrap_or_default();
        let value = self
            .execute(
                Method::GET,
                "/storefront/subcategories",
                &query,
                RequestBody::Empty,
                Auth::Anonymous,
            )
            .await?;
        Ok(decode_list::<RawSubCategory>(value)
            .into_iter()
            .filter_map(RawSubCategory::into_sub_category)
            .collect())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Orders placed by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingToken`] without a stored token.
    pub async fn user_orders(&self, user_id: &UserId) -> Result<Vec<Order>, ApiError> {
        let value = self
            .execute(
                Method::GET,
                &format!("/storefront/orders/{user_id}"),
                &[],
                RequestBody::Empty,
                Auth::Bearer,
            )
            .await?;
        Ok(decode_list(value))
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingToken`] without a stored token.
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        self.request_json(
            Method::POST,
            "/storefront/orders/create",
            Self::json_body(order)?,
            Auth::Bearer,
        )
        .await
    }

    /// Ask the API to cancel an order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingToken`] without a stored token.
    pub async fn cancel_order(&self, id: OrderId) -> Result<(), ApiError> {
        self.execute(
            Method::PATCH,
            &format!("/storefront/orders/update/status/{id}"),
            &[],
            RequestBody::Json(serde_json::json!({ "status": "cancelled" })),
            Auth::Bearer,
        )
        .await?;
        Ok(())
    }

    /// Full details of one order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingToken`] without a stored token.
    pub async fn order_details(&self, id: OrderId) -> Result<Order, ApiError> {
        self.request_json(
            Method::GET,
            &format!("/storefront/orders/details/{id}"),
            RequestBody::Empty,
            Auth::Bearer,
        )
        .await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a token and user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.request_json(
            Method::POST,
            "/storefront/auth/login",
            Self::json_body(credentials)?,
            Auth::Anonymous,
        )
        .await
    }

    /// Create an account. The response body is not used.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn register(&self, details: &RegisterRequest) -> Result<(), ApiError> {
        self.execute(
            Method::POST,
            "/storefront/auth/register",
            &[],
            Self::json_body(details)?,
            Auth::Anonymous,
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Tenant
    // =========================================================================

    /// Look up the tenant serving `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if no store is registered for it.
    #[instrument(skip(self))]
    pub async fn tenant(&self, domain: &str) -> Result<Tenant, ApiError> {
        let value = self
            .execute(
                Method::GET,
                "/tenants/storefront",
                &[("domain", domain.to_string())],
                RequestBody::Empty,
                Auth::Anonymous,
            )
            .await?;
        let payload = unwrap_envelope(value);
        if payload.is_null() {
            return Err(ApiError::NotFound(Some(format!("Store not found: {domain}"))));
        }
        Ok(serde_json::from_value(payload)?)
    }
}

// =============================================================================
// Payload helpers
// =============================================================================

/// Strip a `{ "data": ... }` wrapper if present.
#[must_use]
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decode a (possibly wrapped) list, skipping entries that don't fit `T`.
fn decode_list<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match unwrap_envelope(value) {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| {
                serde_json::from_value(item)
                    .map_err(|e| debug!(error = %e, "Skipping malformed list entry"))
                    .ok()
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            debug!(kind = ?other, "Expected a list payload");
            Vec::new()
        }
    }
}

/// Error message from a response body: `message`, else `error` (string or
/// `{ message }`).
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    match value.get("error")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj.get("message")?.as_str().map(String::from),
        _ => None,
    }
}
