//! `shopfront tenant`

use chrono::{Datelike, Utc};
use serde_json::json;
use shopfront_storefront::content::{FooterContent, HeroContent};
use shopfront_storefront::Store;

use super::CommandResult;
use crate::output;

/// Resolve the tenant and print its theme, gate and content blocks.
pub async fn show(store: &Store) -> CommandResult {
    // A failed lookup is still worth showing: the gate explains it.
    if let Err(e) = store.resolve_tenant().await {
        tracing::warn!(error = %e, "Tenant not resolved");
    }
    let state = store.state().await;
    let tenant = state.tenant.tenant.as_ref();

    output::emit(&json!({
        "domain": store.client().tenant_domain(),
        "gate": state.gate(),
        "error": state.tenant.error.map(|e| e.code()),
        "tenant": tenant.map(|t| json!({ "id": t.id, "name": t.name, "domain": t.domain })),
        "theme": { "id": state.tenant.theme.id, "name": state.tenant.theme.name },
        "darkMode": state.tenant.is_dark_mode,
        "title": state.tenant.style.title,
        "favicon": state.tenant.style.favicon,
        "hero": HeroContent::resolve(tenant, store.images()),
        "footer": FooterContent::resolve(tenant, Utc::now().year(), store.images()),
    }))?;
    Ok(())
}
