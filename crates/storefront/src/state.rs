//! Application state shared across commands.

use std::sync::Arc;

use moto_parts_core::Role;

use crate::api::{ApiClient, ApiError};
use crate::cart::{CartStore, SessionCart};
use crate::config::ClientConfig;
use crate::services::account::{AccountError, AccountService};
use crate::services::checkout::Checkout;
use crate::session::{FileSession, SessionStore};

/// Application state shared across all commands.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// store API client, the session and the configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ClientConfig,
    api: ApiClient,
    session: SessionStore,
}

impl AppState {
    /// Create state backed by the file session in `config.session_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let session = SessionStore::new(FileSession::new(&config.session_dir));
        Self::with_session(config, session)
    }

    /// Create state over an existing session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_session(config: ClientConfig, session: SessionStore) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                session,
            }),
        })
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the store API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the session.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Role of the current session.
    #[must_use]
    pub fn role(&self) -> Role {
        self.inner.session.role()
    }

    /// Account operations for the current session.
    #[must_use]
    pub fn account(&self) -> AccountService {
        AccountService::new(self.inner.api.clone(), self.inner.session.clone())
    }

    /// The cart persisted in the session.
    #[must_use]
    pub fn cart(&self) -> CartStore<SessionCart> {
        CartStore::load(SessionCart(self.inner.session.clone()))
    }

    /// Start a checkout for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotSignedIn` for a guest session, or the
    /// checkout error if the user's addresses cannot be loaded.
    pub async fn checkout(&self) -> Result<Checkout<ApiClient>, crate::Error> {
        let user = self
            .inner
            .session
            .current_user()
            .ok_or(AccountError::NotSignedIn)?;
        Ok(Checkout::begin(self.inner.api.clone(), user.id).await?)
    }
}
