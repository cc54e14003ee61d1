//! Review moderation.

use tracing::instrument;

use moto_parts_core::ReviewId;
use moto_parts_storefront::api::Review;

use crate::client::AdminClient;
use crate::error::AdminError;

impl AdminClient {
    /// Every review in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn reviews(&self) -> Result<Vec<Review>, AdminError> {
        Ok(self.api.reviews().await?)
    }

    /// # Errors
    ///
    /// Returns an error if the API refuses the deletion.
    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn delete_review(&self, id: ReviewId) -> Result<(), AdminError> {
        self.api.delete_review(id).await?;
        tracing::info!("Review deleted");
        Ok(())
    }
}
