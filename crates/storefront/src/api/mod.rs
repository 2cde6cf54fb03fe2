//! Remote REST API access.
//!
//! - [`ApiClient`] - endpoints, headers and the centralized 401 interceptor
//! - [`HttpTransport`] - the network seam, with [`ReqwestTransport`] for
//!   production and [`ScriptedTransport`] for tests
//! - [`types`] - canonical payload types; raw shapes are normalized in
//!   `conversions` before anything leaves this module

mod cache;
mod client;
mod conversions;
mod error;
pub mod scripted;
pub mod transport;
pub mod types;

pub use client::{Auth, ApiClient, LOGOUT_REDIRECT, SessionEvent, unwrap_envelope};
pub use conversions::de;
pub use error::ApiError;
pub use scripted::ScriptedTransport;
pub use transport::{
    ApiRequest, ApiResponse, FilePart, HttpTransport, MultipartForm, ReqwestTransport,
    RequestBody,
};
pub use types::*;
