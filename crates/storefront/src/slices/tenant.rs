//! Tenant resolution, the active theme and dark mode.
//!
//! The storefront serves many shops from one build. The shop is picked by the
//! first label of the hostname (`acme.shop.example` → `acme`), fetched from
//! the API, and its brand drives the theme, title and favicon.

use std::net::IpAddr;

use serde::Serialize;
use shopfront_core::ImageResolver;
use tracing::{debug, info};

use crate::api::Tenant;
use crate::persistence::{Persistence, keys};
use crate::theme::{DocumentStyle, Theme, apply_branding, apply_theme, default_theme, theme_by_index};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TenantPhase {
    #[default]
    Uninitialized,
    Resolving,
    Resolved,
    NotFound,
}

/// Why resolution ended in `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TenantFailure {
    NoSubdomain,
    StoreNotFound,
    FetchError,
}

impl TenantFailure {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NoSubdomain => "NO_SUBDOMAIN",
            Self::StoreNotFound => "STORE_NOT_FOUND",
            Self::FetchError => "FETCH_ERROR",
        }
    }

    /// Whether the failure means "no such store" rather than a transient
    /// problem.
    #[must_use]
    pub const fn is_missing_store(self) -> bool {
        matches!(self, Self::NoSubdomain | Self::StoreNotFound)
    }
}

impl std::fmt::Display for TenantFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantState {
    pub phase: TenantPhase,
    pub tenant: Option<Tenant>,
    pub theme: &'static Theme,
    pub is_dark_mode: bool,
    /// Whether the user picked a mode explicitly (persisted under `darkMode`).
    pub dark_mode_explicit: bool,
    pub is_loading: bool,
    pub is_initialized: bool,
    pub store_not_found: bool,
    pub error: Option<TenantFailure>,
    pub style: DocumentStyle,
}

impl Default for TenantState {
    fn default() -> Self {
        Self {
            phase: TenantPhase::Uninitialized,
            tenant: None,
            theme: default_theme(),
            is_dark_mode: false,
            dark_mode_explicit: false,
            is_loading: true,
            is_initialized: false,
            store_not_found: false,
            error: None,
            style: DocumentStyle::default(),
        }
    }
}

impl TenantState {
    // =========================================================================
    // Resolution
    // =========================================================================

    pub fn begin(&mut self) {
        debug!("Resolving tenant");
        self.phase = TenantPhase::Resolving;
        self.is_loading = true;
        self.error = None;
    }

    /// Store the tenant, select its theme and apply brand and palette.
    pub fn resolved(&mut self, tenant: Tenant, images: &ImageResolver) {
        let theme = theme_by_index(tenant.brand.theme);
        info!(tenant = %tenant.name, theme = theme.name, "Tenant resolved");

        apply_branding(&mut self.style, &tenant, images);
        self.theme = theme;
        self.tenant = Some(tenant);
        self.phase = TenantPhase::Resolved;
        self.is_loading = false;
        self.is_initialized = true;
        self.store_not_found = false;
        self.error = None;
        self.restyle();
    }

    pub fn failed(&mut self, failure: TenantFailure) {
        info!(error = %failure, "Tenant not resolved");
        self.phase = TenantPhase::NotFound;
        self.tenant = None;
        self.is_loading = false;
        self.is_initialized = true;
        self.store_not_found = failure.is_missing_store();
        self.error = Some(failure);
    }

    // =========================================================================
    // Dark mode
    // =========================================================================

    /// Pick the initial mode: a persisted choice wins over the environment.
    pub fn init_dark_mode(&mut self, persistence: &Persistence, env_prefers_dark: bool) {
        match persistence.load::<bool>(keys::DARK_MODE) {
            Some(dark) => {
                self.is_dark_mode = dark;
                self.dark_mode_explicit = true;
            }
            None => {
                self.is_dark_mode = env_prefers_dark;
                self.dark_mode_explicit = false;
            }
        }
        self.restyle();
    }

    /// Follow an environment preference change unless the user chose a mode.
    pub fn environment_changed(&mut self, prefers_dark: bool) -> bool {
        if self.dark_mode_explicit || self.is_dark_mode == prefers_dark {
            return false;
        }
        self.is_dark_mode = prefers_dark;
        self.restyle();
        true
    }

    pub fn set_dark_mode(&mut self, dark: bool, persistence: &Persistence) {
        self.is_dark_mode = dark;
        self.dark_mode_explicit = true;
        persistence.save(keys::DARK_MODE, &dark);
        self.restyle();
    }

    pub fn toggle_dark_mode(&mut self, persistence: &Persistence) {
        self.set_dark_mode(!self.is_dark_mode, persistence);
    }

    fn restyle(&mut self) {
        apply_theme(&mut self.style, self.theme, self.is_dark_mode);
    }
}

/// Derive the tenant identifier from a hostname.
///
/// `acme.shop.example` → `acme`, `acme.localhost` → `acme`. Bare domains,
/// `www`, `localhost` and IP addresses have no tenant.
#[must_use]
pub fn tenant_domain(hostname: &str) -> Option<String> {
    let host = strip_port(hostname.trim()).trim_end_matches('.');
    if host.is_empty() || host.parse::<IpAddr>().is_ok() {
        return None;
    }
    let host = host.to_ascii_lowercase();
    let labels: Vec<&str> = host.split('.').collect();
    let first = *labels.first()?;
    if first.is_empty() || first == "www" {
        return None;
    }

    let local = labels.last().is_some_and(|tld| *tld == "localhost");
    let enough = if local {
        labels.len() > 1 && first != "localhost"
    } else {
        labels.len() >= 3
    };
    enough.then(|| first.to_string())
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // Bracketed IPv6 literal.
        return host
            .trim_start_matches('[')
            .split(']')
            .next()
            .unwrap_or_default();
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::TenantId;

    use super::*;
    use crate::api::Brand;

    fn tenant(theme: i64) -> Tenant {
        Tenant {
            id: TenantId::new("t1"),
            name: "Acme".to_string(),
            domain: "acme".to_string(),
            address: None,
            brand: Brand {
                theme,
                ..Brand::default()
            },
            categories: vec![],
        }
    }

    #[test]
    fn test_tenant_domain_rules() {
        assert_eq!(tenant_domain("acme.shop.example").as_deref(), Some("acme"));
        assert_eq!(tenant_domain("Acme.Shop.Example:8080").as_deref(), Some("acme"));
        assert_eq!(tenant_domain("acme.localhost").as_deref(), Some("acme"));
        assert_eq!(tenant_domain("acme.localhost:5173").as_deref(), Some("acme"));

        assert_eq!(tenant_domain(""), None);
        assert_eq!(tenant_domain("localhost"), None);
        assert_eq!(tenant_domain("localhost:3000"), None);
        assert_eq!(tenant_domain("www.localhost"), None);
        assert_eq!(tenant_domain("shop.example"), None);
        assert_eq!(tenant_domain("www.shop.example"), None);
        assert_eq!(tenant_domain("127.0.0.1"), None);
        assert_eq!(tenant_domain("192.168.1.20:8080"), None);
        assert_eq!(tenant_domain("[::1]:3000"), None);
    }

    #[test]
    fn test_initial_state_is_loading_with_default_theme() {
        let state = TenantState::default();
        assert!(state.is_loading);
        assert!(!state.is_initialized);
        assert_eq!(state.theme.id, 1);
        assert_eq!(state.phase, TenantPhase::Uninitialized);
    }

    #[test]
    fn test_resolved_applies_clamped_theme_and_title() {
        let mut state = TenantState::default();
        state.begin();
        state.resolved(tenant(7), &ImageResolver::new(""));

        assert_eq!(state.phase, TenantPhase::Resolved);
        assert_eq!(state.theme.id, 3);
        assert_eq!(state.style.title.as_deref(), Some("Acme"));
        assert_eq!(state.style.property("--radius"), Some("0.5rem"));
        assert!(state.is_initialized);
        assert!(!state.is_loading);
    }

    #[test]
    fn test_failures_mark_store_not_found() {
        for (failure, missing) in [
            (TenantFailure::NoSubdomain, true),
            (TenantFailure::StoreNotFound, true),
            (TenantFailure::FetchError, false),
        ] {
            let mut state = TenantState::default();
            state.begin();
            state.failed(failure);
            assert_eq!(state.phase, TenantPhase::NotFound);
            assert!(state.is_initialized);
            assert_eq!(state.store_not_found, missing);
            assert_eq!(state.error, Some(failure));
        }
        assert_eq!(TenantFailure::FetchError.code(), "FETCH_ERROR");
    }

    #[test]
    fn test_persisted_dark_mode_beats_environment() {
        let persistence = Persistence::in_memory();
        persistence.save(keys::DARK_MODE, &false);

        let mut state = TenantState::default();
        state.init_dark_mode(&persistence, true);
        assert!(!state.is_dark_mode);
        assert!(!state.environment_changed(true));
        assert!(!state.is_dark_mode);
    }

    #[test]
    fn test_environment_followed_until_explicit_choice() {
        let persistence = Persistence::in_memory();
        let mut state = TenantState::default();
        state.init_dark_mode(&persistence, false);

        assert!(state.environment_changed(true));
        assert!(state.is_dark_mode);
        assert!(state.style.dark);
        // Radius is shared by both modes and stays from the light pass.
        assert_eq!(state.style.property("--radius"), Some(state.theme.radius));

        state.toggle_dark_mode(&persistence);
        assert!(!state.is_dark_mode);
        assert_eq!(persistence.load::<bool>(keys::DARK_MODE), Some(false));
        assert!(!state.environment_changed(true));
    }
}
