//! Review endpoints.

use reqwest::Method;
use tracing::instrument;

use moto_parts_core::{ProductId, ReviewId, UserId};

use super::types::{Review, ReviewDraft};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn reviews(&self) -> Result<Vec<Review>, ApiError> {
        self.get("reviews").await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product))]
    pub async fn product_reviews(&self, product: ProductId) -> Result<Vec<Review>, ApiError> {
        self.get(&format!("reviews/product/{product}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn user_reviews(&self, user: UserId) -> Result<Vec<Review>, ApiError> {
        self.get(&format!("reviews/user/{user}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the API rejects the review.
    #[instrument(skip(self, draft), fields(product_id = %draft.product_id, rating = %draft.rating))]
    pub async fn create_review(&self, draft: &ReviewDraft) -> Result<(), ApiError> {
        self.send_unit(Method::POST, "reviews", draft).await
    }

    /// # Errors
    ///
    /// Returns an error if the API rejects the update.
    #[instrument(skip(self, draft), fields(review_id = %id, rating = %draft.rating))]
    pub async fn update_review(&self, id: ReviewId, draft: &ReviewDraft) -> Result<(), ApiError> {
        self.send_unit(Method::PUT, &format!("reviews/{id}"), draft)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the API refuses the deletion.
    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn delete_review(&self, id: ReviewId) -> Result<(), ApiError> {
        self.delete(&format!("reviews/{id}")).await
    }
}
