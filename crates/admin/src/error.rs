//! Back-office error types.

use thiserror::Error;

use moto_parts_core::Role;
use moto_parts_core::validation::ValidationErrors;
use moto_parts_storefront::api::ApiError;

/// Errors that can occur during back-office operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The session's role does not grant store management.
    #[error("role {0} may not manage the store")]
    Forbidden(Role),

    /// A form failed local validation.
    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationErrors),

    /// The store API failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The PDF export could not be assembled.
    #[error("render error: {0}")]
    Render(#[from] printpdf::Error),

    /// The export could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
