//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod image;
pub mod price;
pub mod status;
pub mod stock;

pub use email::{Email, EmailError};
pub use id::*;
pub use image::{ImageResolver, PLACEHOLDER_IMAGE};
pub use price::Price;
pub use status::*;
pub use stock::reconcile_stock;
