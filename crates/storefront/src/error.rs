//! Unified error handling with Sentry integration.
//!
//! Provides a unified `Error` type over every storefront operation. Front
//! ends call [`Error::report`] once per failed command so the failure is
//! logged and, when it is not the user's fault, captured to Sentry.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::account::AccountError;
use crate::services::checkout::CheckoutError;
use crate::session::StorageError;

/// Storefront-level error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store API error: {0}")]
    Api(#[from] ApiError),

    #[error("Session error: {0}")]
    Session(#[from] StorageError),

    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

impl Error {
    /// Whether the failure points at the service or this client rather than
    /// at what the user typed.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Config(_) | Self::Session(_) => true,
            Self::Api(e) => is_internal_api(e),
            Self::Account(e) => match e {
                AccountError::Api(e) => is_internal_api(e),
                AccountError::Session(_) => true,
                AccountError::Invalid(_)
                | AccountError::InvalidCredentials
                | AccountError::NotSignedIn => false,
            },
            Self::Checkout(e) => match e {
                CheckoutError::AddressesUnavailable(e) | CheckoutError::OrderRejected(e) => {
                    is_internal_api(e)
                }
                CheckoutError::UnknownAddress(_) => false,
                CheckoutError::DeliveryDateOutOfRange => true,
            },
        }
    }

    /// Log the error and capture internal failures to Sentry.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command failed"
            );
        } else {
            tracing::warn!(error = %self, "Command rejected");
        }
    }
}

const fn is_internal_api(error: &ApiError) -> bool {
    !matches!(error, ApiError::Unauthorized | ApiError::NotFound(_))
}

/// Result type alias for `Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Set the Sentry user context after a successful login.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "123")]));
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
    use moto_parts_core::AddressId;

    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Api(ApiError::NotFound("products/9".to_string()));
        assert_eq!(err.to_string(), "Store API error: Not found: products/9");
    }

    #[test]
    fn test_user_mistakes_are_not_internal() {
        assert!(!Error::Account(AccountError::InvalidCredentials).is_internal());
        assert!(!Error::Checkout(CheckoutError::UnknownAddress(AddressId::new(1))).is_internal());
        assert!(!Error::Api(ApiError::Unauthorized).is_internal());
    }

    #[test]
    fn test_service_failures_are_internal() {
        let server = ApiError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert!(Error::Checkout(CheckoutError::OrderRejected(server)).is_internal());
        assert!(Error::Config(ConfigError::MissingEnvVar("X".to_string())).is_internal());
    }
}
