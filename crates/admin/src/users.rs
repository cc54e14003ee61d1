//! User management.

use tracing::instrument;

use moto_parts_core::UserId;
use moto_parts_storefront::api::User;
use moto_parts_storefront::services::account::ProfileForm;

use crate::client::AdminClient;
use crate::error::AdminError;

impl AdminClient {
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn users(&self) -> Result<Vec<User>, AdminError> {
        Ok(self.api.users().await?)
    }

    /// # Errors
    ///
    /// Returns an error if the user does not exist.
    pub async fn user(&self, id: UserId) -> Result<User, AdminError> {
        Ok(self.api.user(id).await?)
    }

    /// Replace a user's profile with the same rules customers follow.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Invalid` for a malformed form.
    #[instrument(skip(self, form), fields(user_id = %id))]
    pub async fn update_user(&self, id: UserId, form: ProfileForm) -> Result<(), AdminError> {
        let update = form.into_update()?;
        self.api.update_user(id, &update).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the API refuses the deletion.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), AdminError> {
        self.api.delete_user(id).await?;
        tracing::info!("User deleted");
        Ok(())
    }
}
