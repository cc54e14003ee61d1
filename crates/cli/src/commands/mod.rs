//! Command implementations.
//!
//! Each module turns one area of the CLI into calls on the storefront and
//! admin libraries and prints the outcome.

pub mod account;
pub mod admin;
pub mod shop;

use thiserror::Error;

use moto_parts_admin::AdminError;
use moto_parts_core::Role;
use moto_parts_storefront::api::ApiError;
use moto_parts_storefront::config::ConfigError;
use moto_parts_storefront::guard::{Access, View, guard};
use moto_parts_storefront::services::{AccountError, CheckoutError};
use moto_parts_storefront::session::StorageError;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Storefront(#[from] moto_parts_storefront::Error),

    #[error("Admin error: {0}")]
    Admin(#[from] AdminError),

    /// The session's role may not use this command.
    #[error("Not available here; go to {0:?} instead")]
    Denied(View),
}

impl CommandError {
    /// Log the failure, capturing internal errors to Sentry.
    pub fn report(&self) {
        match self {
            Self::Storefront(e) => e.report(),
            Self::Admin(AdminError::Api(_) | AdminError::Render(_) | AdminError::Io(_)) => {
                let event_id = sentry::capture_error(self);
                tracing::error!(error = %self, sentry_event_id = %event_id, "Command failed");
            }
            Self::Admin(AdminError::Forbidden(_) | AdminError::Invalid(_)) | Self::Denied(_) => {
                tracing::warn!(error = %self, "Command rejected");
            }
        }
    }
}

macro_rules! storefront_error {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for CommandError {
                fn from(e: $source) -> Self {
                    Self::Storefront(e.into())
                }
            }
        )*
    };
}

storefront_error!(ApiError, AccountError, CheckoutError, StorageError, ConfigError);

/// Stop unless `role` may open `view`.
pub(crate) const fn require(role: Role, view: View) -> Result<(), CommandError> {
    match guard(role, view) {
        Access::Allow => Ok(()),
        Access::Redirect(to) => Err(CommandError::Denied(to)),
    }
}

/// Write one line of command output to stdout.
#[allow(clippy::print_stdout)]
pub(crate) fn say(line: impl std::fmt::Display) {
    println!("{line}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_follows_guard() {
        assert!(require(Role::Customer, View::Cart).is_ok());
        assert!(matches!(
            require(Role::Guest, View::Checkout),
            Err(CommandError::Denied(View::NotFound))
        ));
        assert!(matches!(
            require(Role::Admin, View::Login),
            Err(CommandError::Denied(View::AdminDashboard))
        ));
    }

    #[test]
    fn test_storefront_errors_convert() {
        let err = CommandError::from(AccountError::NotSignedIn);
        assert!(matches!(
            err,
            CommandError::Storefront(moto_parts_storefront::Error::Account(
                AccountError::NotSignedIn
            ))
        ));
    }
}
