//! Shipping address management for the signed-in user.

use tracing::instrument;

use moto_parts_core::AddressId;
use moto_parts_core::validation::{Validate, ValidationErrors, Validator};

use super::account::{AccountError, AccountService};
use crate::api::{Address, AddressPayload};

/// Address form.
#[derive(Debug, Clone, Default)]
pub struct AddressForm {
    pub street: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
}

impl Validate for AddressForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .text("street", &self.street, 1)
            .text("city", &self.city, 1)
            .text("country", &self.country, 1)
            .text("postal_code", &self.postal_code, 1)
            .finish()
    }
}

impl AccountService {
    /// Addresses of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotSignedIn` for a guest session.
    pub async fn addresses(&self) -> Result<Vec<Address>, AccountError> {
        let user = self.current_user()?;
        Ok(self.api.addresses(user.id).await?)
    }

    /// # Errors
    ///
    /// Returns `AccountError::Invalid` for a malformed form.
    #[instrument(skip(self, form))]
    pub async fn add_address(&self, form: AddressForm) -> Result<(), AccountError> {
        let payload = self.address_payload(form)?;
        self.api.create_address(&payload).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AccountError::Invalid` for a malformed form.
    #[instrument(skip(self, form), fields(address_id = %id))]
    pub async fn update_address(&self, id: AddressId, form: AddressForm) -> Result<(), AccountError> {
        let payload = self.address_payload(form)?;
        self.api.update_address(id, &payload).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AccountError::NotSignedIn` for a guest session.
    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn remove_address(&self, id: AddressId) -> Result<(), AccountError> {
        self.current_user()?;
        self.api.delete_address(id).await?;
        Ok(())
    }

    fn address_payload(&self, form: AddressForm) -> Result<AddressPayload, AccountError> {
        let user = self.current_user()?;
        form.validate()?;
        Ok(AddressPayload {
            user_id: user.id,
            street: form.street,
            city: form.city,
            country: form.country,
            postal_code: form.postal_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_required() {
        let errors = AddressForm {
            street: "Gran Via 4".to_string(),
            ..AddressForm::default()
        }
        .validate()
        .unwrap_err();

        assert!(!errors.has("street"));
        assert!(errors.has("city"));
        assert!(errors.has("country"));
        assert!(errors.has("postal_code"));
    }
}
