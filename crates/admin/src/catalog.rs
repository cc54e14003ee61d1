//! Brand, model and product management.

use tracing::instrument;

use moto_parts_core::{BrandId, ModelId, ProductId};
use moto_parts_storefront::api::{Brand, Model, Product};

use crate::client::AdminClient;
use crate::error::AdminError;
use crate::forms::{BrandForm, ModelForm, ProductForm};

impl AdminClient {
    // =========================================================================
    // Brands
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn brands(&self) -> Result<Vec<Brand>, AdminError> {
        Ok(self.api.brands().await?)
    }

    /// # Errors
    ///
    /// Returns `AdminError::Invalid` for a malformed form.
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create_brand(&self, form: BrandForm) -> Result<(), AdminError> {
        let payload = form.into_payload()?;
        self.api.create_brand(&payload).await?;
        tracing::info!("Brand created");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AdminError::Invalid` for a malformed form.
    #[instrument(skip(self, form), fields(brand_id = %id))]
    pub async fn update_brand(&self, id: BrandId, form: BrandForm) -> Result<(), AdminError> {
        let payload = form.into_payload()?;
        self.api.update_brand(id, &payload).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the API refuses the deletion.
    #[instrument(skip(self), fields(brand_id = %id))]
    pub async fn delete_brand(&self, id: BrandId) -> Result<(), AdminError> {
        self.api.delete_brand(id).await?;
        tracing::info!("Brand deleted");
        Ok(())
    }

    // =========================================================================
    // Models
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn models(&self) -> Result<Vec<Model>, AdminError> {
        Ok(self.api.models().await?)
    }

    /// # Errors
    ///
    /// Returns `AdminError::Invalid` for a malformed form.
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create_model(&self, form: ModelForm) -> Result<(), AdminError> {
        let payload = form.into_payload()?;
        self.api.create_model(&payload).await?;
        tracing::info!("Model created");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AdminError::Invalid` for a malformed form.
    #[instrument(skip(self, form), fields(model_id = %id))]
    pub async fn update_model(&self, id: ModelId, form: ModelForm) -> Result<(), AdminError> {
        let payload = form.into_payload()?;
        self.api.update_model(id, &payload).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the API refuses the deletion.
    #[instrument(skip(self), fields(model_id = %id))]
    pub async fn delete_model(&self, id: ModelId) -> Result<(), AdminError> {
        self.api.delete_model(id).await?;
        tracing::info!("Model deleted");
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn products(&self) -> Result<Vec<Product>, AdminError> {
        Ok(self.api.products().await?)
    }

    /// # Errors
    ///
    /// Returns `AdminError::Invalid` for a malformed form.
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create_product(&self, form: ProductForm) -> Result<(), AdminError> {
        let payload = form.into_payload()?;
        self.api.create_product(&payload).await?;
        tracing::info!("Product created");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AdminError::Invalid` for a malformed form.
    #[instrument(skip(self, form), fields(product_id = %id))]
    pub async fn update_product(&self, id: ProductId, form: ProductForm) -> Result<(), AdminError> {
        let payload = form.into_payload()?;
        self.api.update_product(id, &payload).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the API refuses the deletion.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), AdminError> {
        self.api.delete_product(id).await?;
        tracing::info!("Product deleted");
        Ok(())
    }
}
