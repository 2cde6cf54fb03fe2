//! Slice-facing error taxonomy with Sentry integration.
//!
//! Async store operations reject with a [`StoreError`]; the slice records the
//! human-readable form produced by [`StoreError::user_message`].

use thiserror::Error;

use crate::api::ApiError;

/// Error surfaced to slices.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No token is stored; the request was never sent.
    #[error("No authentication token found")]
    Unauthenticated,

    /// The API rejected the session. Auth state has already been purged.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The requested resource does not exist.
    #[error("Not found: {}", .0.as_deref().unwrap_or("resource"))]
    NotFound(Option<String>),

    /// Any other API or transport failure.
    #[error("{}", .message.as_deref().unwrap_or("Request failed"))]
    Api {
        status: Option<u16>,
        message: Option<String>,
    },

    /// The request never produced a usable response.
    #[error("Network error: {0}")]
    Network(String),

    /// Rejected locally before any request.
    #[error("{0}")]
    Validation(String),
}

impl StoreError {
    /// Message to show the user: the server's message when there is one,
    /// otherwise `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Unauthenticated => self.to_string(),
            Self::Validation(message) | Self::Unauthorized(message) => message.clone(),
            Self::Network(_) => fallback.to_string(),
            Self::NotFound(message) | Self::Api { message, .. } => message
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(fallback)
                .to_string(),
        }
    }

    /// Send the error to Sentry if it points at a network or server fault.
    pub fn report(&self) {
        let reportable = match self {
            Self::Api { status, .. } => status.is_none_or(|s| s >= 500),
            Self::Network(_) => true,
            _ => false,
        };
        if reportable {
            let event_id = sentry::capture_error(self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Store operation failed");
        }
    }
}

impl From<ApiError> for StoreError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::MissingToken => Self::Unauthenticated,
            ApiError::Unauthorized(message) => Self::Unauthorized(message),
            ApiError::NotFound(message) => Self::NotFound(message),
            ApiError::Server { status, message } => Self::Api {
                status: Some(status),
                message,
            },
            other => Self::Network(other.to_string()),
        }
    }
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a user action.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "p1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_message() {
        let err = StoreError::Api {
            status: Some(422),
            message: Some("Insufficient stock".to_string()),
        };
        assert_eq!(err.user_message("Failed to create order"), "Insufficient stock");

        let err = StoreError::Api {
            status: Some(500),
            message: None,
        };
        assert_eq!(err.user_message("Failed to create order"), "Failed to create order");
    }

    #[test]
    fn test_unauthenticated_message() {
        assert_eq!(
            StoreError::Unauthenticated.user_message("ignored"),
            "No authentication token found"
        );
    }

    #[test]
    fn test_from_api_error() {
        assert!(matches!(
            StoreError::from(ApiError::MissingToken),
            StoreError::Unauthenticated
        ));
        assert!(matches!(
            StoreError::from(ApiError::NotFound(None)),
            StoreError::NotFound(None)
        ));
        let err = StoreError::from(ApiError::Transport("connection reset".to_string()));
        assert_eq!(err.user_message("Failed to load products"), "Failed to load products");
        assert_eq!(err.to_string(), "Network error: Transport error: connection reset");
    }
}
