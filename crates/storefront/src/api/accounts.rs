//! Authentication, user and address endpoints.

use reqwest::Method;
use secrecy::SecretString;
use tracing::instrument;

use moto_parts_core::{AddressId, UserId};

use super::types::{
    Address, AddressPayload, LoginRequest, LoginResponse, PasswordResetRequest, ProfileUpdate,
    RegisterRequest, User,
};
use super::{ApiClient, ApiError};

impl ApiClient {
    // =========================================================================
    // Authentication
    // =========================================================================

    /// Exchange credentials for the account's id and role.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for bad credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        self.send(Method::POST, "auth/login", &LoginRequest { email, password })
            .await
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the registration.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest<'_>) -> Result<(), ApiError> {
        self.send_unit(Method::POST, "auth/register", request).await
    }

    /// Ask the API to send a password reset email.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn reset_password(&self, email: &str) -> Result<(), ApiError> {
        self.send_unit(
            Method::POST,
            "auth/reset-password",
            &PasswordResetRequest { email },
        )
        .await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the user does not exist.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn user(&self, id: UserId) -> Result<User, ApiError> {
        self.get(&format!("users/{id}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.get("users").await
    }

    /// Replace a user's profile fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the update.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub async fn update_user(&self, id: UserId, update: &ProfileUpdate) -> Result<(), ApiError> {
        self.send_unit(Method::PUT, &format!("users/{id}"), update)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the API refuses the deletion.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.delete(&format!("users/{id}")).await
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Addresses stored for `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn addresses(&self, user: UserId) -> Result<Vec<Address>, ApiError> {
        self.get(&format!("addresses/{user}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the API rejects the address.
    #[instrument(skip(self, payload), fields(user_id = %payload.user_id))]
    pub async fn create_address(&self, payload: &AddressPayload) -> Result<(), ApiError> {
        self.send_unit(Method::POST, "addresses", payload).await
    }

    /// # Errors
    ///
    /// Returns an error if the API rejects the update.
    #[instrument(skip(self, payload), fields(address_id = %id))]
    pub async fn update_address(
        &self,
        id: AddressId,
        payload: &AddressPayload,
    ) -> Result<(), ApiError> {
        self.send_unit(Method::PUT, &format!("addresses/{id}"), payload)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the API refuses the deletion.
    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn delete_address(&self, id: AddressId) -> Result<(), ApiError> {
        self.delete(&format!("addresses/{id}")).await
    }
}
