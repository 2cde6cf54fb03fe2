//! State slices.
//!
//! Each slice owns a plain state struct with synchronous reducer methods.
//! Async operations live on [`Store`](crate::store::Store), which drives the
//! pending, fulfilled and rejected transitions through [`OpStatus`].

pub mod cart;
pub mod favorites;
pub mod orders;
pub mod products;
pub mod tenant;
pub mod user;

pub use cart::{CartItem, CartState, CheckoutSummary};
pub use favorites::{FavoriteItem, FavoritesState};
pub use orders::OrdersState;
pub use products::ProductsState;
pub use tenant::{TenantFailure, TenantPhase, TenantState, tenant_domain};
pub use user::{UserPatch, UserProfile, UserState};

use serde::Serialize;

/// Loading flag and last error for one async operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpStatus {
    pub loading: bool,
    pub error: Option<String>,
}

impl OpStatus {
    /// Pending: loading, previous error cleared.
    pub fn start(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Fulfilled.
    pub fn succeed(&mut self) {
        self.loading = false;
        self.error = None;
    }

    /// Rejected with `message`.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }
}
