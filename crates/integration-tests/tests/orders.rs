//! Order lifecycle: create, cancel, details and checkout.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use shopfront_core::{OrderId, OrderStatus, Price, ProductId, UserId};
use shopfront_integration_tests::{Method, TENANT_HOST, TestContext};
use shopfront_storefront::api::{NewOrderLine, RequestBody};
use shopfront_storefront::{Action, StoreError};

fn line(id: &str, quantity: u32, cents: i64) -> NewOrderLine {
    NewOrderLine {
        product_id: ProductId::new(id),
        quantity,
        unit_price: Price::from_cents(cents),
    }
}

fn json_body(body: RequestBody) -> serde_json::Value {
    match body {
        RequestBody::Json(value) => value,
        other => panic!("expected JSON body, got {other:?}"),
    }
}

// =============================================================================
// Create and cancel
// =============================================================================

#[tokio::test]
async fn test_create_then_cancel() {
    let ctx = TestContext::new(TENANT_HOST);
    ctx.sign_in("CUSTOMER").await;
    ctx.transport.respond(
        Method::POST,
        "/storefront/orders/create",
        200,
        json!({ "data": { "id": 10, "totalAmount": 25, "status": "pending" } }),
    );
    ctx.transport.respond(
        Method::PATCH,
        "/storefront/orders/update/status/10",
        200,
        json!({ "data": {} }),
    );

    let order = ctx
        .store
        .create_order(vec![line("a", 2, 1000), line("b", 1, 500)])
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let create = ctx.transport.last_request().unwrap();
    let body = json_body(create.body);
    assert_eq!(body["totalAmount"], json!(25.0));
    assert_eq!(body["order_items"].as_array().unwrap().len(), 2);

    ctx.store.cancel_order(OrderId::new(10)).await.unwrap();
    let cancel = ctx.transport.last_request().unwrap();
    assert_eq!(cancel.method, Method::PATCH);
    assert_eq!(json_body(cancel.body), json!({ "status": "cancelled" }));

    let requests: Vec<Method> = ctx
        .transport
        .requests()
        .into_iter()
        .map(|r| r.method)
        .collect();
    assert_eq!(requests, [Method::POST, Method::POST, Method::PATCH]);

    let state = ctx.store.state().await;
    assert_eq!(state.orders.orders[0].id, OrderId::new(10));
    assert_eq!(state.orders.orders[0].status, OrderStatus::Cancelled);
    assert!(state.orders.cancel_order.error.is_none());
}

#[tokio::test]
async fn test_failed_cancel_keeps_status() {
    let ctx = TestContext::new(TENANT_HOST);
    ctx.sign_in("CUSTOMER").await;
    ctx.transport.respond(
        Method::GET,
        "/storefront/orders/u1",
        200,
        json!({ "data": [{ "id": 4, "totalAmount": 9, "status": "pending" }] }),
    );
    ctx.transport.respond(
        Method::PATCH,
        "/storefront/orders/update/status/4",
        409,
        json!({ "message": "Order already processing" }),
    );

    ctx.store.fetch_user_orders(&UserId::new("u1")).await.unwrap();
    assert!(ctx.store.cancel_order(OrderId::new(4)).await.is_err());

    let state = ctx.store.state().await;
    assert_eq!(state.orders.orders[0].status, OrderStatus::Pending);
    assert_eq!(
        state.orders.cancel_order.error.as_deref(),
        Some("Order already processing")
    );
}

#[tokio::test]
async fn test_order_details_become_selected() {
    let ctx = TestContext::new(TENANT_HOST);
    ctx.sign_in("CUSTOMER").await;
    ctx.transport.respond(
        Method::GET,
        "/storefront/orders/details/8",
        200,
        json!({ "data": { "id": 8, "totalAmount": 30, "status": "shipped" } }),
    );

    ctx.store.fetch_order_details(OrderId::new(8)).await.unwrap();
    let state = ctx.store.state().await;
    assert_eq!(state.orders.selected_order.as_ref().unwrap().id, OrderId::new(8));

    ctx.store.dispatch(Action::ClearSelectedOrder).await;
    assert!(ctx.store.state().await.orders.selected_order.is_none());
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_without_session_keeps_cart() {
    let ctx = TestContext::new(TENANT_HOST);
    ctx.store.dispatch(Action::add_to_cart(ctx.product("p1", 100, 3).await, 1)).await;

    let err = ctx.store.checkout().await.unwrap_err();
    assert!(matches!(err, StoreError::Unauthenticated));
    assert_eq!(ctx.transport.count(Method::POST, "/storefront/orders/create"), 0);

    let state = ctx.store.state().await;
    assert_eq!(state.cart.total_items, 1);
    assert_eq!(
        state.orders.create_order.error.as_deref(),
        Some("No authentication token found")
    );
}

#[tokio::test]
async fn test_failed_checkout_keeps_cart() {
    let ctx = TestContext::new(TENANT_HOST);
    ctx.sign_in("CUSTOMER").await;
    ctx.store.dispatch(Action::add_to_cart(ctx.product("p1", 100, 3).await, 2)).await;
    ctx.transport.respond(
        Method::POST,
        "/storefront/orders/create",
        500,
        json!({ "message": "Payment declined" }),
    );

    assert!(ctx.store.checkout().await.is_err());
    let state = ctx.store.state().await;
    assert_eq!(state.cart.total_items, 2);
    assert!(state.orders.orders.is_empty());
    assert_eq!(state.orders.create_order.error.as_deref(), Some("Payment declined"));
}
