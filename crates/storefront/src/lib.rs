//! Shopfront storefront library.
//!
//! The client-side state core of a multi-tenant storefront: the REST API
//! client with its centralized forced-logout interceptor, local persistence,
//! the state slices, tenant resolution with theming, and the [`Store`] that
//! ties them together.
//!
//! ```rust,ignore
//! let config = StorefrontConfig::from_env()?;
//! let persistence = Persistence::new(FileStore::open(&config.storage_path)?);
//! let transport = Arc::new(ReqwestTransport::new(config.request_timeout)?);
//! let store = Store::new(&config, persistence, transport);
//!
//! store.bootstrap(false).await?;
//! store.fetch_all_products(ProductFilter::default()).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod gate;
pub mod persistence;
pub mod slices;
pub mod store;
pub mod theme;

pub use config::StorefrontConfig;
pub use error::{Result, StoreError};
pub use gate::RenderGate;
pub use persistence::{FileStore, MemoryStore, Persistence};
pub use store::{Action, AppState, Store};
