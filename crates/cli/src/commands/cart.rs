//! `shopfront cart` and `shopfront favorites`

use shopfront_core::ProductId;
use shopfront_storefront::{Action, Store};

use super::CommandResult;
use crate::output;

pub async fn add(
    store: &Store,
    id: &str,
    quantity: u32,
    size: Option<String>,
    color: Option<String>,
) -> CommandResult {
    let product = store.fetch_product_by_id(&ProductId::new(id)).await?;
    store
        .dispatch(Action::AddToCart {
            product: Box::new(product),
            quantity,
            size,
            color,
        })
        .await;
    show(store).await
}

pub async fn remove(
    store: &Store,
    id: &str,
    size: Option<String>,
    color: Option<String>,
) -> CommandResult {
    store
        .dispatch(Action::RemoveFromCart {
            id: ProductId::new(id),
            size,
            color,
        })
        .await;
    show(store).await
}

pub async fn set(
    store: &Store,
    id: &str,
    quantity: i64,
    size: Option<String>,
    color: Option<String>,
) -> CommandResult {
    store
        .dispatch(Action::SetQuantity {
            id: ProductId::new(id),
            size,
            color,
            quantity,
        })
        .await;
    show(store).await
}

pub async fn clear(store: &Store) -> CommandResult {
    store.dispatch(Action::ClearCart).await;
    show(store).await
}

pub async fn show(store: &Store) -> CommandResult {
    let state = store.state().await;
    output::emit(&serde_json::json!({
        "items": state.cart.items,
        "summary": state.cart.checkout_summary(),
    }))?;
    Ok(())
}

pub async fn toggle_favorite(store: &Store, id: &str) -> CommandResult {
    let product = store.fetch_product_by_id(&ProductId::new(id)).await?;
    store.dispatch(Action::toggle_favorite(product)).await;
    let now_favorite = store.state().await.favorites.contains(&ProductId::new(id));
    output::status(if now_favorite {
        "Added to favorites"
    } else {
        "Removed from favorites"
    });
    Ok(())
}

pub async fn favorites(store: &Store) -> CommandResult {
    output::emit(&store.state().await.favorites.items)?;
    Ok(())
}
