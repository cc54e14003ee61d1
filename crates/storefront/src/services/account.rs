//! Account service.
//!
//! Login, registration, profile and order history for the signed-in user.
//! Every form is validated locally before anything is sent.

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;

use moto_parts_core::validation::{
    MIN_LOGIN_PASSWORD_LENGTH, MIN_NEW_PASSWORD_LENGTH, MIN_TEXT_LENGTH, Validate,
    ValidationErrors, Validator,
};
use moto_parts_core::{Gender, OrderId};

use crate::api::{ApiClient, ApiError, Order, OrderLine, ProfileUpdate, RegisterRequest, User};
use crate::guard::{View, landing_view};
use crate::models::CurrentUser;
use crate::session::{SessionStore, StorageError};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// A form failed local validation.
    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationErrors),

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The operation needs a signed-in user.
    #[error("not signed in")]
    NotSignedIn,

    /// The store API failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The session could not be updated.
    #[error("session error: {0}")]
    Session(#[from] StorageError),
}

// =============================================================================
// Forms
// =============================================================================

/// Login form.
#[derive(Debug)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .text("email", &self.email, MIN_TEXT_LENGTH)
            .password(
                "password",
                self.password.expose_secret(),
                MIN_LOGIN_PASSWORD_LENGTH,
            )
            .finish()
    }
}

/// Registration form.
#[derive(Debug)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: SecretString,
}

impl Validate for RegistrationForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .person_name("first_name", &self.first_name)
            .person_name("last_name", &self.last_name)
            .email("email", &self.email)
            .password(
                "password",
                self.password.expose_secret(),
                MIN_NEW_PASSWORD_LENGTH,
            )
            .finish()
    }
}

/// Profile edit form, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// `YYYY-MM-DD`.
    pub birth_date: String,
    pub gender: String,
}

impl Validate for ProfileForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .person_name("first_name", &self.first_name)
            .person_name("last_name", &self.last_name)
            .email("email", &self.email)
            .phone("phone", &self.phone)
            .iso_date("birth_date", &self.birth_date)
            .gender("gender", &self.gender)
            .finish()
    }
}

impl ProfileForm {
    /// Prefill the form from a stored user.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            birth_date: user
                .birth_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            gender: user.gender.map(|g| g.to_string()).unwrap_or_default(),
        }
    }

    /// Validate and convert into the API body.
    ///
    /// # Errors
    ///
    /// Returns every field error found.
    pub fn into_update(self) -> Result<ProfileUpdate, ValidationErrors> {
        self.validate()?;

        let parsed = NaiveDate::parse_from_str(&self.birth_date, "%Y-%m-%d")
            .ok()
            .zip(self.gender.parse::<Gender>().ok());
        let Some((birth_date, gender)) = parsed else {
            return Err(Validator::new()
                .iso_date("birth_date", &self.birth_date)
                .gender("gender", &self.gender)
                .finish()
                .err()
                .unwrap_or_default());
        };

        Ok(ProfileUpdate {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            birth_date,
            gender,
        })
    }
}

// =============================================================================
// Service
// =============================================================================

/// Account operations for the current session.
#[derive(Clone)]
pub struct AccountService {
    pub(crate) api: ApiClient,
    pub(crate) session: SessionStore,
}

impl AccountService {
    #[must_use]
    pub const fn new(api: ApiClient, session: SessionStore) -> Self {
        Self { api, session }
    }

    /// The signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotSignedIn` for a guest session.
    pub fn current_user(&self) -> Result<CurrentUser, AccountError> {
        self.session.current_user().ok_or(AccountError::NotSignedIn)
    }

    /// Sign in and return the view to open next.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Invalid` for a malformed form and
    /// `AccountError::InvalidCredentials` if the API refuses the login.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn login(&self, form: &LoginForm) -> Result<View, AccountError> {
        form.validate()?;

        let response = self
            .api
            .login(&form.email, &form.password)
            .await
            .map_err(|e| match e {
                ApiError::Unauthorized | ApiError::NotFound(_) => AccountError::InvalidCredentials,
                other => AccountError::Api(other),
            })?;

        self.session.sign_in(CurrentUser {
            id: response.user_id,
            role: response.role,
        })?;

        tracing::info!(user_id = %response.user_id, role = %response.role, "Signed in");
        Ok(landing_view(response.role))
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Invalid` for a malformed form, or the API
    /// error if registration is refused.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<(), AccountError> {
        form.validate()?;

        self.api
            .register(&RegisterRequest {
                first_name: &form.first_name,
                last_name: &form.last_name,
                email: &form.email,
                password: &form.password,
            })
            .await?;

        tracing::info!("Account registered");
        Ok(())
    }

    /// Request a password reset email.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Invalid` for a malformed address.
    pub async fn reset_password(&self, email: &str) -> Result<(), AccountError> {
        Validator::new().email("email", email).finish()?;
        self.api.reset_password(email).await?;
        Ok(())
    }

    /// The signed-in user's stored profile.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotSignedIn` for a guest session.
    pub async fn profile(&self) -> Result<User, AccountError> {
        let user = self.current_user()?;
        Ok(self.api.user(user.id).await?)
    }

    /// Save profile changes.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Invalid` for a malformed form.
    #[instrument(skip(self, form))]
    pub async fn update_profile(&self, form: ProfileForm) -> Result<(), AccountError> {
        let user = self.current_user()?;
        let update = form.into_update()?;
        self.api.update_user(user.id, &update).await?;
        Ok(())
    }

    /// Forget the session, cart included.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Session` if the session cannot be cleared.
    pub fn logout(&self) -> Result<(), AccountError> {
        self.session.sign_out()?;
        tracing::info!("Signed out");
        Ok(())
    }

    // =========================================================================
    // Order history
    // =========================================================================

    /// Orders placed by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotSignedIn` for a guest session.
    pub async fn orders(&self) -> Result<Vec<Order>, AccountError> {
        let user = self.current_user()?;
        Ok(self.api.user_orders(user.id).await?)
    }

    /// Lines of one of the user's orders.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotSignedIn` for a guest session.
    pub async fn order_lines(&self, order: OrderId) -> Result<Vec<OrderLine>, AccountError> {
        self.current_user()?;
        Ok(self.api.order_lines(order).await?)
    }
}
