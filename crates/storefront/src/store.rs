//! The store container.
//!
//! [`Store`] owns every slice behind one async lock, the API client and the
//! persistence handle. Synchronous actions go through [`Store::dispatch`];
//! async operations are methods that mark the slice pending, release the
//! lock, await the API and then apply the outcome. Every transition publishes
//! a snapshot on a `watch` channel.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use shopfront_core::{CategoryId, ImageResolver, OrderId, Price, ProductId, UserId};
use tokio::sync::{RwLock, broadcast, watch};
use tracing::{debug, info, instrument, warn};

use crate::api::{
    ApiClient, ApiError, HttpTransport, NewOrder, NewOrderLine, Order, Product, ProductFilter,
    SessionEvent,
};
use crate::config::StorefrontConfig;
use crate::error::{Result, StoreError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::gate::RenderGate;
use crate::persistence::Persistence;
use crate::slices::orders::{
    CANCEL_ORDER_FAILED, CREATE_ORDER_FAILED, FETCH_DETAILS_FAILED, FETCH_ORDERS_FAILED,
};
use crate::slices::products::{
    LOAD_CATEGORIES_FAILED, LOAD_PRODUCT_FAILED, LOAD_PRODUCTS_FAILED, LOAD_SUBCATEGORIES_FAILED,
    SubcategoryScope,
};
use crate::slices::user::{LOGIN_FAILED, REGISTER_FAILED, validate_login, validate_registration};
use crate::slices::{
    CartState, FavoritesState, OrdersState, ProductsState, TenantFailure, TenantState, UserPatch,
    UserState, tenant_domain,
};

pub const EMPTY_CART: &str = "Your cart is empty";

/// Every slice, as one snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    pub cart: CartState,
    pub favorites: FavoritesState,
    pub orders: OrdersState,
    pub products: ProductsState,
    pub user: UserState,
    pub tenant: TenantState,
}

impl AppState {
    #[must_use]
    pub fn gate(&self) -> RenderGate {
        RenderGate::from(&self.tenant)
    }
}

/// Synchronous state changes.
#[derive(Debug, Clone)]
pub enum Action {
    AddToCart {
        product: Box<Product>,
        quantity: u32,
        size: Option<String>,
        color: Option<String>,
    },
    RemoveFromCart {
        id: ProductId,
        size: Option<String>,
        color: Option<String>,
    },
    SetQuantity {
        id: ProductId,
        size: Option<String>,
        color: Option<String>,
        quantity: i64,
    },
    ClearCart,
    ToggleCart,
    SetCartOpen(bool),

    AddFavorite {
        product: Box<Product>,
        rating: Option<f64>,
        original_price: Option<Price>,
    },
    RemoveFavorite(ProductId),
    ToggleFavorite {
        product: Box<Product>,
        rating: Option<f64>,
        original_price: Option<Price>,
    },
    ClearFavorites,
    ToggleFavorites,
    SetFavoritesOpen(bool),

    SetDarkMode(bool),
    ToggleDarkMode,
    /// The environment's color-scheme preference changed.
    EnvironmentDarkMode(bool),

    SetSelectedOrder(Option<Box<Order>>),
    ClearSelectedOrder,
    ClearOrderErrors,

    SetUser(UserPatch),
    Logout,
}

impl Action {
    /// Convenience for the common "add one of this" case.
    #[must_use]
    pub fn add_to_cart(product: Product, quantity: u32) -> Self {
        Self::AddToCart {
            product: Box::new(product),
            quantity,
            size: None,
            color: None,
        }
    }

    #[must_use]
    pub fn toggle_favorite(product: Product) -> Self {
        Self::ToggleFavorite {
            product: Box::new(product),
            rating: None,
            original_price: None,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Shared state container. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: RwLock<AppState>,
    client: ApiClient,
    persistence: Persistence,
    catalog_stale_after: Duration,
    snapshots: watch::Sender<AppState>,
    session: Mutex<broadcast::Receiver<SessionEvent>>,
    redirect: Mutex<Option<String>>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("client", &self.inner.client)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Build a store for `config`, sending requests through `transport`.
    ///
    /// The tenant domain is derived from `config.hostname` once, here.
    #[must_use]
    pub fn new(
        config: &StorefrontConfig,
        persistence: Persistence,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let client = ApiClient::new(
            config.api_base_url.clone(),
            tenant_domain(&config.hostname),
            ImageResolver::new(config.image_base_url.clone()),
            persistence.clone(),
            transport,
        );
        let session = client.subscribe_session();
        let (snapshots, _) = watch::channel(AppState::default());

        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(AppState::default()),
                client,
                persistence,
                catalog_stale_after: config.catalog_stale_after,
                snapshots,
                session: Mutex::new(session),
                redirect: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    #[must_use]
    pub fn persistence(&self) -> &Persistence {
        &self.inner.persistence
    }

    #[must_use]
    pub fn images(&self) -> &ImageResolver {
        self.inner.client.images()
    }

    /// A copy of the current state.
    pub async fn state(&self) -> AppState {
        self.inner.state.read().await.clone()
    }

    /// Receive a snapshot after every transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.inner.snapshots.subscribe()
    }

    /// Apply `f` under the write lock and publish the result.
    async fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let mut state = self.inner.state.write().await;
        let out = f(&mut state);
        self.inner.snapshots.send_replace(state.clone());
        out
    }

    // =========================================================================
    // Startup
    // =========================================================================

    /// App start: rehydrate, then resolve the tenant and apply its theme.
    ///
    /// # Errors
    ///
    /// Returns the tenant resolution error; the tenant slice records it too.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self, env_prefers_dark: bool) -> Result<()> {
        self.rehydrate(env_prefers_dark).await;
        self.resolve_tenant().await
    }

    /// Load cart, favorites, auth and dark mode from persistence.
    pub async fn rehydrate(&self, env_prefers_dark: bool) {
        let persistence = &self.inner.persistence;
        self.update(|s| {
            s.cart.initialize(persistence);
            s.favorites.initialize(persistence);
            s.user.initialize_auth(persistence);
            s.tenant.init_dark_mode(persistence, env_prefers_dark);
            if s.user.is_logged_in {
                set_sentry_user(&s.user.profile.id, Some(&s.user.profile.email));
            }
        })
        .await;
    }

    /// Look up the tenant for the configured hostname.
    ///
    /// No request is made when the hostname carries no subdomain.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown or missing store, or the API error.
    #[instrument(skip(self))]
    pub async fn resolve_tenant(&self) -> Result<()> {
        let Some(domain) = self.inner.client.tenant_domain().map(str::to_string) else {
            self.update(|s| s.tenant.failed(TenantFailure::NoSubdomain)).await;
            return Err(StoreError::NotFound(Some(TenantFailure::NoSubdomain.code().to_string())));
        };

        self.update(|s| s.tenant.begin()).await;
        let result = self.inner.client.tenant(&domain).await;
        self.handle_session_events().await;

        match result {
            Ok(tenant) => {
                let images = self.inner.client.images();
                self.update(|s| s.tenant.resolved(tenant, images)).await;
                Ok(())
            }
            Err(err) => {
                let failure = if matches!(err, ApiError::NotFound(_)) {
                    TenantFailure::StoreNotFound
                } else {
                    TenantFailure::FetchError
                };
                let err = StoreError::from(err);
                err.report();
                self.update(|s| s.tenant.failed(failure)).await;
                Err(err)
            }
        }
    }

    // =========================================================================
    // Synchronous actions
    // =========================================================================

    /// Apply a synchronous action and persist whatever the slice persists.
    pub async fn dispatch(&self, action: Action) {
        let persistence = &self.inner.persistence;
        self.update(|s| match action {
            Action::AddToCart {
                product,
                quantity,
                size,
                color,
            } => {
                add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product.id.as_str())]));
                s.cart.add_item(&product, quantity, size, color);
                s.cart.persist(persistence);
            }
            Action::RemoveFromCart { id, size, color } => {
                s.cart.remove_item(&id, size.as_deref(), color.as_deref());
                s.cart.persist(persistence);
            }
            Action::SetQuantity {
                id,
                size,
                color,
                quantity,
            } => {
                s.cart
                    .set_quantity(&id, size.as_deref(), color.as_deref(), quantity);
                s.cart.persist(persistence);
            }
            Action::ClearCart => {
                s.cart.clear();
                s.cart.persist(persistence);
            }
            Action::ToggleCart => s.cart.toggle_open(),
            Action::SetCartOpen(open) => s.cart.set_open(open),

            Action::AddFavorite {
                product,
                rating,
                original_price,
            } => {
                if s.favorites.add(&product, rating, original_price) {
                    s.favorites.persist(persistence);
                }
            }
            Action::RemoveFavorite(id) => {
                if s.favorites.remove(&id) {
                    s.favorites.persist(persistence);
                }
            }
            Action::ToggleFavorite {
                product,
                rating,
                original_price,
            } => {
                s.favorites.toggle(&product, rating, original_price);
                s.favorites.persist(persistence);
            }
            Action::ClearFavorites => {
                s.favorites.clear();
                s.favorites.persist(persistence);
            }
            Action::ToggleFavorites => s.favorites.toggle_open(),
            Action::SetFavoritesOpen(open) => s.favorites.set_open(open),

            Action::SetDarkMode(dark) => s.tenant.set_dark_mode(dark, persistence),
            Action::ToggleDarkMode => s.tenant.toggle_dark_mode(persistence),
            Action::EnvironmentDarkMode(dark) => {
                s.tenant.environment_changed(dark);
            }

            Action::SetSelectedOrder(order) => s.orders.set_selected_order(order.map(|o| *o)),
            Action::ClearSelectedOrder => s.orders.clear_selected_order(),
            Action::ClearOrderErrors => s.orders.clear_errors(),

            Action::SetUser(patch) => {
                s.user.set_user(patch, persistence);
            }
            Action::Logout => {
                info!("Signed out");
                s.user.logout(persistence);
                clear_sentry_user();
            }
        })
        .await;
    }

    // =========================================================================
    // Session events
    // =========================================================================

    /// Apply pending session events from the API client.
    ///
    /// A forced logout resets the user slice and records where to navigate.
    /// Store operations call this after every request; embedders may call it
    /// too.
    pub async fn handle_session_events(&self) {
        let events: Vec<SessionEvent> = {
            let mut rx = self
                .inner
                .session
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let mut events = Vec::new();
            loop {
                match rx.try_recv() {
                    Ok(event) => events.push(event),
                    Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                        warn!(skipped, "Session events lagged");
                    }
                    Err(_) => break,
                }
            }
            events
        };

        for event in events {
            match event {
                SessionEvent::ForcedLogout { redirect_to } => {
                    debug!(%redirect_to, "Applying forced logout");
                    self.update(|s| s.user.reset()).await;
                    *self
                        .inner
                        .redirect
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner) = Some(redirect_to);
                }
            }
        }
    }

    /// Take the pending navigation target, if a forced logout set one.
    #[must_use]
    pub fn take_redirect(&self) -> Option<String> {
        self.inner
            .redirect
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Convert a failed request, report it and apply any forced logout.
    async fn rejected(&self, err: ApiError) -> StoreError {
        self.handle_session_events().await;
        let err = StoreError::from(err);
        err.report();
        err
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Load the listing for `filter`.
    ///
    /// A response that arrives after a newer listing request started is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns the request error; the slice records its message.
    #[instrument(skip(self))]
    pub async fn fetch_all_products(&self, filter: ProductFilter) -> Result<()> {
        let generation = self
            .update(|s| s.products.begin_listing(filter.clone()))
            .await;
        match self.inner.client.products(filter).await {
            Ok(items) => {
                let applied = self
                    .update(|s| s.products.finish_listing(generation, Ok(items), Utc::now()))
                    .await;
                if !applied {
                    debug!(generation, "Dropped stale product listing");
                }
                Ok(())
            }
            Err(err) => {
                let err = self.rejected(err).await;
                let message = err.user_message(LOAD_PRODUCTS_FAILED);
                self.update(|s| {
                    s.products
                        .finish_listing(generation, Err(message), Utc::now())
                })
                .await;
                Err(err)
            }
        }
    }

    /// Load one product into `current_item`.
    ///
    /// # Errors
    ///
    /// Returns the request error; the slice records its message.
    #[instrument(skip(self))]
    pub async fn fetch_product_by_id(&self, id: &ProductId) -> Result<Product> {
        let generation = self.update(|s| s.products.begin_current()).await;
        match self.inner.client.product(id).await {
            Ok(product) => {
                self.update(|s| s.products.finish_current(generation, Ok(product.clone())))
                    .await;
                Ok(product)
            }
            Err(err) => {
                let err = self.rejected(err).await;
                let message = err.user_message(LOAD_PRODUCT_FAILED);
                self.update(|s| s.products.finish_current(generation, Err(message)))
                    .await;
                Err(err)
            }
        }
    }

    /// Load categories unless the held ones are still fresh.
    ///
    /// # Errors
    ///
    /// Returns the request error; the slice records its message.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self, force: bool) -> Result<()> {
        let window = self.inner.catalog_stale_after;
        let fresh = self
            .update(|s| {
                let fresh = !force && s.products.categories_fresh(Utc::now(), window);
                if !fresh {
                    s.products.categories_status.start();
                }
                fresh
            })
            .await;
        if fresh {
            debug!("Categories still fresh");
            return Ok(());
        }

        match self.inner.client.categories().await {
            Ok(categories) => {
                self.update(|s| s.products.set_categories(categories, Utc::now()))
                    .await;
                Ok(())
            }
            Err(err) => {
                let err = self.rejected(err).await;
                let message = err.user_message(LOAD_CATEGORIES_FAILED);
                self.update(|s| s.products.categories_status.fail(message))
                    .await;
                Err(err)
            }
        }
    }

    /// Subcategories of one category.
    ///
    /// # Errors
    ///
    /// Returns the request error; the slice records its message.
    pub async fn fetch_subcategories(&self, category: CategoryId) -> Result<()> {
        self.load_subcategories(SubcategoryScope::Category(category))
            .await
    }

    /// Every subcategory.
    ///
    /// # Errors
    ///
    /// Returns the request error; the slice records its message.
    pub async fn fetch_all_subcategories(&self) -> Result<()> {
        self.load_subcategories(SubcategoryScope::All).await
    }

    #[instrument(skip(self))]
    async fn load_subcategories(&self, scope: SubcategoryScope) -> Result<()> {
        let window = self.inner.catalog_stale_after;
        let fresh = self
            .update(|s| {
                let fresh = s.products.subcategories_fresh(scope, Utc::now(), window);
                if !fresh {
                    s.products.subcategories_status.start();
                }
                fresh
            })
            .await;
        if fresh {
            return Ok(());
        }

        let category = match scope {
            SubcategoryScope::All => None,
            SubcategoryScope::Category(id) => Some(id),
        };
        match self.inner.client.subcategories(category).await {
            Ok(subcategories) => {
                self.update(|s| {
                    s.products
                        .set_subcategories(scope, subcategories, Utc::now());
                })
                .await;
                Ok(())
            }
            Err(err) => {
                let err = self.rejected(err).await;
                let message = err.user_message(LOAD_SUBCATEGORIES_FAILED);
                self.update(|s| s.products.subcategories_status.fail(message))
                    .await;
                Err(err)
            }
        }
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Replace the order list with the user's orders.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a stored token, otherwise the request error.
    /// The existing list is kept on failure.
    #[instrument(skip(self))]
    pub async fn fetch_user_orders(&self, user_id: &UserId) -> Result<()> {
        self.update(|s| s.orders.fetch_orders.start()).await;
        match self.inner.client.user_orders(user_id).await {
            Ok(orders) => {
                self.update(|s| {
                    s.orders.replace(orders, Utc::now());
                    s.orders.fetch_orders.succeed();
                })
                .await;
                Ok(())
            }
            Err(err) => {
                let err = self.rejected(err).await;
                let message = err.user_message(FETCH_ORDERS_FAILED);
                self.update(|s| s.orders.fetch_orders.fail(message)).await;
                Err(err)
            }
        }
    }

    /// Submit an order for `lines`; the total is the sum of the lines.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a stored token, otherwise the request error.
    pub async fn create_order(&self, lines: Vec<NewOrderLine>) -> Result<Order> {
        self.submit_order(NewOrder::from_lines(lines)).await
    }

    #[instrument(skip(self, order), fields(lines = order.items.len(), total = %order.total_amount))]
    async fn submit_order(&self, order: NewOrder) -> Result<Order> {
        self.update(|s| s.orders.create_order.start()).await;
        match self.inner.client.create_order(&order).await {
            Ok(created) => {
                info!(order_id = %created.id, "Order placed");
                self.update(|s| {
                    s.orders.prepend(created.clone());
                    s.orders.create_order.succeed();
                })
                .await;
                Ok(created)
            }
            Err(err) => {
                let err = self.rejected(err).await;
                let message = err.user_message(CREATE_ORDER_FAILED);
                self.update(|s| s.orders.create_order.fail(message)).await;
                Err(err)
            }
        }
    }

    /// Cancel a pending order.
    ///
    /// # Errors
    ///
    /// `Validation` if the order is known to be past pending (nothing is
    /// sent), `Unauthenticated` without a token, otherwise the request error.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, id: OrderId) -> Result<()> {
        let allowed = self
            .update(|s| match s.orders.ensure_cancellable(id) {
                Ok(()) => {
                    s.orders.cancel_order.start();
                    Ok(())
                }
                Err(message) => {
                    s.orders.cancel_order.fail(message);
                    Err(message)
                }
            })
            .await;
        if let Err(message) = allowed {
            return Err(StoreError::Validation(message.to_string()));
        }

        match self.inner.client.cancel_order(id).await {
            Ok(()) => {
                info!(order_id = %id, "Order cancelled");
                self.update(|s| {
                    s.orders.mark_cancelled(id);
                    s.orders.cancel_order.succeed();
                })
                .await;
                Ok(())
            }
            Err(err) => {
                let err = self.rejected(err).await;
                let message = err.user_message(CANCEL_ORDER_FAILED);
                self.update(|s| s.orders.cancel_order.fail(message)).await;
                Err(err)
            }
        }
    }

    /// Load one order into `selected_order`.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a token, otherwise the request error.
    #[instrument(skip(self))]
    pub async fn fetch_order_details(&self, id: OrderId) -> Result<Order> {
        self.update(|s| s.orders.fetch_order_details.start()).await;
        match self.inner.client.order_details(id).await {
            Ok(order) => {
                self.update(|s| {
                    s.orders.set_selected_order(Some(order.clone()));
                    s.orders.fetch_order_details.succeed();
                })
                .await;
                Ok(order)
            }
            Err(err) => {
                let err = self.rejected(err).await;
                let message = err.user_message(FETCH_DETAILS_FAILED);
                self.update(|s| s.orders.fetch_order_details.fail(message))
                    .await;
                Err(err)
            }
        }
    }

    /// Place an order for the cart: lines at their unit prices, total with
    /// shipping and tax. Once the order is created, the submitted lines are
    /// removed; lines added while the request was in flight stay.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty cart, otherwise as [`Self::create_order`].
    pub async fn checkout(&self) -> Result<Order> {
        let (submitted, lines, total) = {
            let state = self.inner.state.read().await;
            let submitted: Vec<_> = state
                .cart
                .items
                .iter()
                .map(|i| (i.id.clone(), i.size.clone(), i.color.clone()))
                .collect();
            (submitted, state.cart.order_lines(), state.cart.checkout_summary().total)
        };
        if lines.is_empty() {
            return Err(StoreError::Validation(EMPTY_CART.to_string()));
        }
        add_breadcrumb("checkout", "Submitting order", None);

        let order = self.submit_order(NewOrder::with_total(lines, total)).await?;
        let persistence = &self.inner.persistence;
        self.update(|s| {
            for (id, size, color) in &submitted {
                s.cart.remove_item(id, size.as_deref(), color.as_deref());
            }
            s.cart.persist(persistence);
            s.cart.set_open(false);
        })
        .await;
        Ok(order)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Sign in.
    ///
    /// # Errors
    ///
    /// `Validation` for bad input or an incomplete response, otherwise the
    /// request error.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let request = match validate_login(email, password) {
            Ok(request) => request,
            Err(message) => {
                self.update(|s| s.user.login.fail(message.clone())).await;
                return Err(StoreError::Validation(message));
            }
        };

        self.update(|s| s.user.login.start()).await;
        let response = match self.inner.client.login(&request).await {
            Ok(response) => response,
            Err(err) => {
                let err = self.rejected(err).await;
                let message = err.user_message(LOGIN_FAILED);
                self.update(|s| s.user.login.fail(message)).await;
                return Err(err);
            }
        };

        let persistence = &self.inner.persistence;
        self.update(|s| {
            let accepted = s
                .user
                .accept_login(response, persistence)
                .map(|profile| (profile.id.clone(), profile.email.clone()));
            match accepted {
                Ok((id, email)) => {
                    set_sentry_user(&id, Some(&email));
                    Ok(())
                }
                Err(message) => {
                    warn!(message, "Rejected login response");
                    s.user.login.fail(message);
                    Err(StoreError::Validation(message.to_string()))
                }
            }
        })
        .await
    }

    /// Create an account. The user still signs in afterwards.
    ///
    /// # Errors
    ///
    /// `Validation` for bad input, otherwise the request error.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str, name: &str, phone: &str) -> Result<()> {
        let request = match validate_registration(email, password, name, phone) {
            Ok(request) => request,
            Err(message) => {
                self.update(|s| s.user.register.fail(message.clone())).await;
                return Err(StoreError::Validation(message));
            }
        };

        self.update(|s| s.user.register.start()).await;
        match self.inner.client.register(&request).await {
            Ok(()) => {
                info!("Account registered");
                self.update(|s| s.user.register.succeed()).await;
                Ok(())
            }
            Err(err) => {
                let err = self.rejected(err).await;
                let message = err.user_message(REGISTER_FAILED);
                self.update(|s| s.user.register.fail(message)).await;
                Err(err)
            }
        }
    }
}
