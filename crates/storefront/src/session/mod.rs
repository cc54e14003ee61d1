//! Session storage.
//!
//! A small string key/value store that lives as long as the user's session.
//! [`SessionStore`] layers typed accessors for the keys in
//! [`crate::models::session::keys`] over any [`SessionStorage`] backend.

mod file;
mod memory;

pub use file::FileSession;
pub use memory::MemorySession;

use std::sync::Arc;

use thiserror::Error;

use moto_parts_core::{Role, UserId};

use crate::models::session::{CurrentUser, keys};

/// Errors raised by a session backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A string key/value backend.
pub trait SessionStorage: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Remove every key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Typed view over a session backend.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    /// A session kept only in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemorySession::default())
    }

    /// The logged-in user, if any.
    ///
    /// Missing or unreadable keys mean nobody is logged in.
    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        let id = self.read(keys::USER_ID)?.parse::<UserId>().ok()?;
        let role = self.read(keys::USER_ROLE)?.parse::<Role>().ok()?;
        Some(CurrentUser { id, role })
    }

    /// Role of the session; `Guest` when nobody is logged in.
    #[must_use]
    pub fn role(&self) -> Role {
        self.current_user().map_or(Role::Guest, |u| u.role)
    }

    /// Record a successful login.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub fn sign_in(&self, user: CurrentUser) -> Result<(), StorageError> {
        self.storage.set(keys::USER_ID, &user.id.to_string())?;
        self.storage.set(keys::USER_ROLE, user.role.as_str())
    }

    /// Forget everything, cart included.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub fn sign_out(&self) -> Result<(), StorageError> {
        self.storage.clear()
    }

    /// Flag that the last checkout placed an order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub fn mark_order_created(&self) -> Result<(), StorageError> {
        self.storage.set(keys::ORDER_CREATED, "true")
    }

    /// Whether an order was placed during this session.
    #[must_use]
    pub fn order_created(&self) -> bool {
        self.read(keys::ORDER_CREATED).as_deref() == Some("true")
    }

    /// Raw persisted cart document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub fn cart_document(&self) -> Result<Option<String>, StorageError> {
        self.storage.get(keys::CART)
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub fn set_cart_document(&self, document: &str) -> Result<(), StorageError> {
        self.storage.set(keys::CART, document)
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub fn remove_cart_document(&self) -> Result<(), StorageError> {
        self.storage.remove(keys::CART)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, key, "Failed to read session key");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_by_default() {
        let session = SessionStore::in_memory();
        assert!(session.current_user().is_none());
        assert_eq!(session.role(), Role::Guest);
        assert!(!session.order_created());
    }

    #[test]
    fn test_sign_in_and_out() {
        let session = SessionStore::in_memory();
        session
            .sign_in(CurrentUser {
                id: UserId::new(12),
                role: Role::Admin,
            })
            .unwrap();
        session.set_cart_document("[]").unwrap();

        let user = session.current_user().unwrap();
        assert_eq!(user.id, UserId::new(12));
        assert_eq!(session.role(), Role::Admin);

        session.sign_out().unwrap();
        assert!(session.current_user().is_none());
        assert!(session.cart_document().unwrap().is_none());
    }

    #[test]
    fn test_unparseable_user_is_guest() {
        let storage = MemorySession::default();
        storage.set(keys::USER_ID, "twelve").unwrap();
        storage.set(keys::USER_ROLE, "customer").unwrap();
        let session = SessionStore::new(storage);

        assert!(session.current_user().is_none());
        assert_eq!(session.role(), Role::Guest);
    }

    #[test]
    fn test_order_created_flag() {
        let session = SessionStore::in_memory();
        session.mark_order_created().unwrap();
        assert!(session.order_created());
    }
}
