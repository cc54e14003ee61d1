//! Brand, model and product endpoints.

use reqwest::Method;
use tracing::instrument;

use moto_parts_core::{BrandId, ModelId, ProductId};

use super::cache::{CacheKey, CacheValue};
use super::types::{Brand, BrandPayload, Model, ModelPayload, Product, ProductPayload};
use super::{ApiClient, ApiError};

impl ApiClient {
    // =========================================================================
    // Reads (cached)
    // =========================================================================

    /// All brands.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn brands(&self) -> Result<Vec<Brand>, ApiError> {
        self.cached(CacheKey::Brands, "brands", CacheValue::Brands, |v| match v {
            CacheValue::Brands(items) => Some(items),
            _ => None,
        })
        .await
    }

    /// All models.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn models(&self) -> Result<Vec<Model>, ApiError> {
        self.cached(CacheKey::Models, "models", CacheValue::Models, |v| match v {
            CacheValue::Models(items) => Some(items),
            _ => None,
        })
        .await
    }

    /// All products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        self.cached(CacheKey::Products, "products", CacheValue::Products, |v| {
            match v {
                CacheValue::Products(items) => Some(items),
                _ => None,
            }
        })
        .await
    }

    /// Look up one product.
    ///
    /// Served from the cached listing when possible; falls back to
    /// `GET /products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if no such product exists.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        if let Some(product) = self.products().await?.into_iter().find(|p| p.id == id) {
            return Ok(product);
        }
        self.get(&format!("products/{id}")).await
    }

    /// Models made by `brand`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn models_of_brand(&self, brand: BrandId) -> Result<Vec<Model>, ApiError> {
        Ok(self
            .models()
            .await?
            .into_iter()
            .filter(|m| m.brand_id == Some(brand))
            .collect())
    }

    /// Products that fit `model`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn products_of_model(&self, model: ModelId) -> Result<Vec<Product>, ApiError> {
        Ok(self
            .products()
            .await?
            .into_iter()
            .filter(|p| p.model_id == Some(model))
            .collect())
    }

    // =========================================================================
    // Writes (invalidate the cache)
    // =========================================================================

    /// Create a brand.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the brand.
    #[instrument(skip(self, payload), fields(name = %payload.name))]
    pub async fn create_brand(&self, payload: &BrandPayload) -> Result<(), ApiError> {
        self.send_unit(Method::POST, "brands", payload).await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Replace a brand.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the update.
    #[instrument(skip(self, payload), fields(brand_id = %id))]
    pub async fn update_brand(&self, id: BrandId, payload: &BrandPayload) -> Result<(), ApiError> {
        self.send_unit(Method::PUT, &format!("brands/{id}"), payload)
            .await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Delete a brand.
    ///
    /// # Errors
    ///
    /// Returns an error if the API refuses the deletion.
    #[instrument(skip(self), fields(brand_id = %id))]
    pub async fn delete_brand(&self, id: BrandId) -> Result<(), ApiError> {
        self.delete(&format!("brands/{id}")).await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Create a model.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the model.
    #[instrument(skip(self, payload), fields(name = %payload.name))]
    pub async fn create_model(&self, payload: &ModelPayload) -> Result<(), ApiError> {
        self.send_unit(Method::POST, "models", payload).await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Replace a model.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the update.
    #[instrument(skip(self, payload), fields(model_id = %id))]
    pub async fn update_model(&self, id: ModelId, payload: &ModelPayload) -> Result<(), ApiError> {
        self.send_unit(Method::PUT, &format!("models/{id}"), payload)
            .await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Delete a model.
    ///
    /// # Errors
    ///
    /// Returns an error if the API refuses the deletion.
    #[instrument(skip(self), fields(model_id = %id))]
    pub async fn delete_model(&self, id: ModelId) -> Result<(), ApiError> {
        self.delete(&format!("models/{id}")).await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the product.
    #[instrument(skip(self, payload), fields(name = %payload.name))]
    pub async fn create_product(&self, payload: &ProductPayload) -> Result<(), ApiError> {
        self.send_unit(Method::POST, "products", payload).await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Replace a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the update.
    #[instrument(skip(self, payload), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        payload: &ProductPayload,
    ) -> Result<(), ApiError> {
        self.send_unit(Method::PUT, &format!("products/{id}"), payload)
            .await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API refuses the deletion.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.delete(&format!("products/{id}")).await?;
        self.invalidate_catalog();
        Ok(())
    }
}
