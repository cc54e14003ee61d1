//! Product reviews.

use tracing::instrument;

use moto_parts_core::validation::{Validate, ValidationErrors, Validator};
use moto_parts_core::{ProductId, Rating, ReviewId};

use super::account::{AccountError, AccountService};
use crate::api::{Review, ReviewDraft};

/// Mean star rating, or `0.0` when there are no reviews.
#[must_use]
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let stars: u32 = reviews.iter().map(|r| u32::from(r.rating.stars())).sum();
    f64::from(stars) / f64::from(u32::try_from(reviews.len()).unwrap_or(u32::MAX))
}

/// Review form.
#[derive(Debug, Clone)]
pub struct ReviewForm {
    pub product_id: ProductId,
    pub rating: u8,
    pub comment: String,
}

impl Validate for ReviewForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Err(e) = Rating::new(self.rating) {
            v.fail("rating", e.to_string());
        }
        v.text("comment", &self.comment, 1).finish()
    }
}

impl AccountService {
    /// Reviews of one product. Available to guests.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn product_reviews(&self, product: ProductId) -> Result<Vec<Review>, AccountError> {
        Ok(self.api.product_reviews(product).await?)
    }

    /// Reviews written by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotSignedIn` for a guest session.
    pub async fn my_reviews(&self) -> Result<Vec<Review>, AccountError> {
        let user = self.current_user()?;
        Ok(self.api.user_reviews(user.id).await?)
    }

    /// # Errors
    ///
    /// Returns `AccountError::Invalid` for a malformed form.
    #[instrument(skip(self, form), fields(product_id = %form.product_id))]
    pub async fn post_review(&self, form: ReviewForm) -> Result<(), AccountError> {
        let draft = self.review_draft(form)?;
        self.api.create_review(&draft).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AccountError::Invalid` for a malformed form.
    #[instrument(skip(self, form), fields(review_id = %id))]
    pub async fn edit_review(&self, id: ReviewId, form: ReviewForm) -> Result<(), AccountError> {
        let draft = self.review_draft(form)?;
        self.api.update_review(id, &draft).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AccountError::NotSignedIn` for a guest session.
    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn delete_review(&self, id: ReviewId) -> Result<(), AccountError> {
        self.current_user()?;
        self.api.delete_review(id).await?;
        Ok(())
    }

    fn review_draft(&self, form: ReviewForm) -> Result<ReviewDraft, AccountError> {
        let user = self.current_user()?;
        form.validate()?;
        let rating = Rating::new(form.rating).map_err(|e| {
            let mut v = Validator::new();
            v.fail("rating", e.to_string());
            v.finish().err().unwrap_or_default()
        })?;

        Ok(ReviewDraft {
            user_id: user.id,
            product_id: form.product_id,
            rating,
            comment: form.comment,
        })
    }
}
