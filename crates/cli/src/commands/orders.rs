//! `shopfront orders` and `shopfront checkout`

use shopfront_core::OrderId;
use shopfront_storefront::{Store, StoreError};

use super::CommandResult;
use crate::output;

async fn signed_in_user(store: &Store) -> Result<shopfront_core::UserId, StoreError> {
    let state = store.state().await;
    if state.user.is_logged_in {
        Ok(state.user.profile.id)
    } else {
        Err(StoreError::Unauthenticated)
    }
}

pub async fn list(store: &Store) -> CommandResult {
    let user_id = signed_in_user(store).await?;
    store.fetch_user_orders(&user_id).await?;
    output::emit(&store.state().await.orders.orders)?;
    Ok(())
}

pub async fn show(store: &Store, id: OrderId) -> CommandResult {
    let order = store.fetch_order_details(id).await?;
    output::emit(&order)?;
    Ok(())
}

pub async fn cancel(store: &Store, id: OrderId) -> CommandResult {
    // Load the list first so a non-pending order is refused without a request.
    if let Ok(user_id) = signed_in_user(store).await {
        store.fetch_user_orders(&user_id).await?;
    }
    store.cancel_order(id).await?;
    output::status(&format!("Order {id} cancelled"));
    Ok(())
}

pub async fn checkout(store: &Store) -> CommandResult {
    let summary = store.state().await.cart.checkout_summary();
    let order = store.checkout().await?;
    output::emit(&serde_json::json!({ "order": order, "summary": summary }))?;
    Ok(())
}
