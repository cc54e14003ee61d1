//! Role-checked access to the store API's management endpoints.

use moto_parts_core::{Capability, Role};
use moto_parts_storefront::api::ApiClient;

use crate::error::AdminError;

/// Store API client for back-office work.
///
/// Holding one proves the session was an admin when it was built.
///
/// # Example
///
/// ```rust,ignore
/// let admin = AdminClient::new(state.api().clone(), state.role())?;
/// let orders = admin.orders().await?;
/// ```
#[derive(Clone)]
pub struct AdminClient {
    pub(crate) api: ApiClient,
}

impl AdminClient {
    /// Wrap `api` for a session with `role`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Forbidden` unless `role` may manage the store.
    pub fn new(api: ApiClient, role: Role) -> Result<Self, AdminError> {
        if !role.can(Capability::ManageStore) {
            tracing::warn!(%role, "Refusing back-office access");
            return Err(AdminError::Forbidden(role));
        }
        Ok(Self { api })
    }

    /// The underlying store API client.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }
}
