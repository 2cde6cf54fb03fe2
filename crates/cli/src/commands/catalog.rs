//! `shopfront products` and `shopfront categories`

use shopfront_admin::filter_products;
use shopfront_core::{CategoryId, ProductId, SubCategoryId};
use shopfront_storefront::Store;
use shopfront_storefront::api::ProductFilter;

use super::CommandResult;
use crate::output;

pub async fn list(
    store: &Store,
    category: Option<CategoryId>,
    sub_category: Option<SubCategoryId>,
    query: Option<&str>,
) -> CommandResult {
    store
        .fetch_all_products(ProductFilter {
            category,
            sub_category,
        })
        .await?;
    let state = store.state().await;
    let items = filter_products(&state.products.items, query.unwrap_or_default());
    output::emit(&items)?;
    Ok(())
}

pub async fn show(store: &Store, id: &str) -> CommandResult {
    let product = store.fetch_product_by_id(&ProductId::new(id)).await?;
    output::emit(&product)?;
    Ok(())
}

pub async fn categories(store: &Store, category: Option<CategoryId>) -> CommandResult {
    store.fetch_categories(false).await?;
    match category {
        Some(id) => store.fetch_subcategories(id).await?,
        None => store.fetch_all_subcategories().await?,
    }
    let state = store.state().await;
    output::emit(&serde_json::json!({
        "categories": state.products.categories,
        "subcategories": state.products.subcategories,
    }))?;
    Ok(())
}
