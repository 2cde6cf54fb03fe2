//! What the shell should render for the current tenant state.

use serde::Serialize;

use crate::slices::TenantState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RenderGate {
    /// Spinner while the tenant is being resolved.
    Loading,
    StoreNotFound,
    Storefront,
}

impl From<&TenantState> for RenderGate {
    fn from(state: &TenantState) -> Self {
        if !state.is_initialized {
            Self::Loading
        } else if state.store_not_found || state.tenant.is_none() {
            Self::StoreNotFound
        } else {
            Self::Storefront
        }
    }
}

impl std::fmt::Display for RenderGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Loading => "loading",
            Self::StoreNotFound => "store-not-found",
            Self::Storefront => "storefront",
        })
    }
}
