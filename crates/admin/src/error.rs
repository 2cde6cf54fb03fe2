//! Unified error handling for dashboard operations.

use shopfront_storefront::api::ApiError;
use thiserror::Error;

use crate::forms::FormErrors;

/// Error returned by [`AdminClient`](crate::AdminClient) operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No session is stored.
    #[error("No authentication token found")]
    Unauthenticated,

    /// The stored session is not a staff account.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The product form failed validation; nothing was sent.
    #[error("Invalid product: {0}")]
    Invalid(FormErrors),

    /// The API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AdminError {
    /// Message suitable for a toast; server text when present, else
    /// `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Unauthenticated | Self::Forbidden(_) | Self::Invalid(_) => self.to_string(),
            Self::Api(ApiError::MissingToken) => ApiError::MissingToken.to_string(),
            Self::Api(err) => err
                .server_message()
                .filter(|m| !m.is_empty())
                .unwrap_or(fallback)
                .to_string(),
        }
    }

    /// Report network and server faults to Sentry.
    pub fn report(&self) {
        if let Self::Api(err) = self
            && err.is_reportable()
        {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }
    }
}

/// Result type alias for `AdminError`.
pub type Result<T> = std::result::Result<T, AdminError>;
