//! Subcommand implementations.

use std::sync::Arc;

use shopfront_storefront::api::ReqwestTransport;
use shopfront_storefront::{FileStore, Persistence, Store, StorefrontConfig};

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod tenant;

/// Result type shared by the subcommands.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open file-backed persistence and the HTTP transport, build the store and
/// rehydrate it.
///
/// # Errors
///
/// Returns an error if the storage file cannot be read or the HTTP client
/// cannot be built.
pub async fn open_store(
    config: &StorefrontConfig,
    prefers_dark: bool,
) -> Result<Store, Box<dyn std::error::Error>> {
    let persistence = Persistence::new(FileStore::open(&config.storage_path)?);
    let transport = Arc::new(ReqwestTransport::new(config.request_timeout)?);
    let store = Store::new(config, persistence, transport);
    store.rehydrate(prefers_dark).await;
    tracing::debug!(storage = %config.storage_path.display(), "Store opened");
    Ok(store)
}
