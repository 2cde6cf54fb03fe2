//! Shopfront Core - Shared types library.
//!
//! This crate provides common types used across all Shopfront components:
//! - `storefront` - Client-side state core (slices, API client, tenant pipeline)
//! - `admin` - Dashboard operations for product and order management
//! - `cli` - Headless shell driving the store from a terminal
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no persistence. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, statuses, plus the
//!   shared image resolver and stock reconciliation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
