//! Catalog forms.
//!
//! Fields are kept as typed so validation can report exactly what is wrong
//! with them; `into_payload` validates and converts in one step.

use std::str::FromStr;

use rust_decimal::Decimal;

use moto_parts_core::validation::{MIN_TEXT_LENGTH, Validate, ValidationErrors, Validator};
use moto_parts_core::{BrandId, ModelId, Money};
use moto_parts_storefront::api::{BrandPayload, ModelPayload, ProductPayload};

/// Brand form.
#[derive(Debug, Clone, Default)]
pub struct BrandForm {
    pub name: String,
    pub description: String,
}

impl Validate for BrandForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .text("name", &self.name, MIN_TEXT_LENGTH)
            .text("description", &self.description, MIN_TEXT_LENGTH)
            .finish()
    }
}

impl BrandForm {
    /// # Errors
    ///
    /// Returns every field error found.
    pub fn into_payload(self) -> Result<BrandPayload, ValidationErrors> {
        self.validate()?;
        Ok(BrandPayload {
            name: self.name,
            description: self.description,
        })
    }
}

/// Model form.
#[derive(Debug, Clone, Default)]
pub struct ModelForm {
    pub name: String,
    pub description: String,
    pub brand_id: Option<BrandId>,
}

impl Validate for ModelForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .text("name", &self.name, MIN_TEXT_LENGTH)
            .text("description", &self.description, MIN_TEXT_LENGTH)
            .finish()
    }
}

impl ModelForm {
    /// # Errors
    ///
    /// Returns every field error found.
    pub fn into_payload(self) -> Result<ModelPayload, ValidationErrors> {
        self.validate()?;
        Ok(ModelPayload {
            name: self.name,
            description: self.description,
            brand_id: self.brand_id,
        })
    }
}

/// Product form. Price and stock are raw text input.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub model_id: Option<ModelId>,
}

impl Validate for ProductForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .text("name", &self.name, MIN_TEXT_LENGTH)
            .text("description", &self.description, MIN_TEXT_LENGTH)
            .price("price", &self.price)
            .selected("model_id", self.model_id.as_ref())
            .digits("stock", &self.stock)
            .finish()
    }
}

impl ProductForm {
    /// # Errors
    ///
    /// Returns every field error found.
    pub fn into_payload(self) -> Result<ProductPayload, ValidationErrors> {
        self.validate()?;

        let mut v = Validator::new();
        let price = Decimal::from_str(&self.price).ok();
        if price.is_none() {
            v.fail("price", "is not a valid amount");
        }
        let stock = self.stock.parse::<u32>().ok();
        if stock.is_none() {
            v.fail("stock", "is too large");
        }

        match (price, stock, self.model_id) {
            (Some(price), Some(stock), Some(model_id)) => Ok(ProductPayload {
                name: self.name,
                description: self.description,
                price: Money::new(price),
                stock,
                model_id,
            }),
            _ => Err(v.finish().err().unwrap_or_default()),
        }
    }
}
