//! Forced logout and stored-session rehydration.
//!
//! An auth failure from any endpoint must purge the stored session, reset
//! the user slice and leave a redirect for the shell to follow.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use shopfront_core::{OrderId, ProductId};
use shopfront_integration_tests::{Method, TENANT_HOST, TestContext};
use shopfront_storefront::api::{LOGOUT_REDIRECT, ProductFilter};
use shopfront_storefront::persistence::keys;
use shopfront_storefront::{Action, Persistence, StoreError};

// =============================================================================
// Forced logout
// =============================================================================

#[tokio::test]
async fn test_unauthorized_from_any_slice_purges_session() {
    let scenarios: [(Method, &str); 4] = [
        (Method::GET, "/storefront/products"),
        (Method::GET, "/storefront/categories"),
        (Method::GET, "/storefront/orders/details/7"),
        (Method::GET, "/storefront/products/p1"),
    ];

    for (method, path) in scenarios {
        let ctx = TestContext::new(TENANT_HOST);
        ctx.sign_in("CUSTOMER").await;
        assert!(ctx.has_stored_auth());

        ctx.transport
            .respond(method, path, 401, json!({ "message": "Unauthorized" }));
        let result = match path {
            "/storefront/products" => ctx.store.fetch_all_products(ProductFilter::default()).await,
            "/storefront/categories" => ctx.store.fetch_categories(true).await,
            "/storefront/orders/details/7" => ctx
                .store
                .fetch_order_details(OrderId::new(7))
                .await
                .map(|_| ()),
            _ => ctx
                .store
                .fetch_product_by_id(&ProductId::new("p1"))
                .await
                .map(|_| ()),
        };

        assert!(matches!(result, Err(StoreError::Unauthorized(_))), "{path}");
        assert!(!ctx.has_stored_auth(), "{path} left auth keys behind");
        let state = ctx.store.state().await;
        assert!(!state.user.is_logged_in, "{path}");
        assert_eq!(ctx.store.take_redirect().as_deref(), Some(LOGOUT_REDIRECT));
    }
}

#[tokio::test]
async fn test_unauthorized_message_on_other_status_forces_logout() {
    let ctx = TestContext::new(TENANT_HOST);
    ctx.sign_in("CUSTOMER").await;
    ctx.transport.respond(
        Method::GET,
        "/storefront/categories",
        500,
        json!({ "error": { "message": "Unauthorized: token expired" } }),
    );

    assert!(ctx.store.fetch_categories(true).await.is_err());
    assert!(!ctx.has_stored_auth());
    assert!(!ctx.store.state().await.user.is_logged_in);
}

#[tokio::test]
async fn test_other_failures_keep_session() {
    let ctx = TestContext::new(TENANT_HOST);
    ctx.sign_in("CUSTOMER").await;
    ctx.transport
        .respond(Method::GET, "/storefront/categories", 500, json!({ "message": "boom" }));

    let err = ctx.store.fetch_categories(true).await.unwrap_err();
    assert!(matches!(err, StoreError::Api { status: Some(500), .. }));
    assert!(ctx.has_stored_auth());
    assert!(ctx.store.state().await.user.is_logged_in);
    assert!(ctx.store.take_redirect().is_none());
}

#[tokio::test]
async fn test_admin_rejection_resets_storefront_user() {
    let ctx = TestContext::new(TENANT_HOST);
    ctx.sign_in("ADMIN").await;
    ctx.transport
        .respond(Method::DELETE, "/products/p1", 401, json!({ "message": "Unauthorized" }));

    let admin = ctx.admin();
    assert!(admin.delete_product(&ProductId::new("p1")).await.is_err());

    ctx.store.handle_session_events().await;
    assert!(!ctx.store.state().await.user.is_logged_in);
    assert!(!ctx.has_stored_auth());
    assert_eq!(ctx.store.take_redirect().as_deref(), Some(LOGOUT_REDIRECT));
}

// =============================================================================
// Rehydration
// =============================================================================

#[tokio::test]
async fn test_session_survives_restart() {
    let persistence = Persistence::in_memory();
    let first = TestContext::with_persistence(TENANT_HOST, persistence.clone());
    first.sign_in("ADMIN").await;

    let second = TestContext::with_persistence(TENANT_HOST, persistence);
    second.store.rehydrate(false).await;

    let state = second.store.state().await;
    assert!(state.user.is_logged_in);
    assert!(state.user.is_admin());
    assert_eq!(state.user.profile.email, "ada@example.com");
}

#[tokio::test]
async fn test_incomplete_stored_session_is_purged() {
    let persistence = Persistence::in_memory();
    persistence.save(keys::TOKEN, "tok");
    persistence.save(keys::ROLE, "ADMIN");

    let ctx = TestContext::with_persistence(TENANT_HOST, persistence);
    ctx.store.rehydrate(false).await;

    assert!(!ctx.store.state().await.user.is_logged_in);
    assert!(!ctx.has_stored_auth());
}

#[tokio::test]
async fn test_logout_clears_stored_session() {
    let ctx = TestContext::new(TENANT_HOST);
    ctx.sign_in("CUSTOMER").await;

    ctx.store.dispatch(Action::Logout).await;

    assert!(!ctx.has_stored_auth());
    assert!(!ctx.store.state().await.user.is_logged_in);
}
