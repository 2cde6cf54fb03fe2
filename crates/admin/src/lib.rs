//! Shopfront admin library.
//!
//! Dashboard operations over the storefront API: product create, update and
//! delete with image uploads, the store-wide order list and order status
//! changes, plus the form validation and list filters the dashboard uses.
//!
//! # Security
//!
//! Every call requires a stored session with a staff role
//! ([`UserRole::is_staff`](shopfront_core::UserRole::is_staff)) and runs
//! through the storefront's shared 401 interceptor.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod error;
pub mod filters;
pub mod forms;

pub use client::AdminClient;
pub use error::{AdminError, Result};
pub use filters::{OrderFilter, filter_products};
pub use forms::{FormErrors, ProductForm, ValidProduct, image_part};
