//! File-backed session backend.
//!
//! The whole session is one JSON object in `<dir>/session.json`. Writes go
//! to a temporary file first and are renamed into place, so a crash never
//! leaves a truncated session behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{SessionStorage, StorageError};

const SESSION_FILE: &str = "session.json";

type Entries = BTreeMap<String, String>;

/// Session persisted across CLI invocations.
///
/// Every call does blocking `std::fs` I/O on the calling thread. That is
/// fine for the one-shot CLI; a long-running async host should keep the
/// session on a blocking thread (`tokio::task::spawn_blocking`) or use
/// [`MemorySession`](super::MemorySession) instead.
#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSession {
    /// Open (or lazily create) the session stored under `dir`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SESSION_FILE),
            lock: Mutex::new(()),
        }
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Entries, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "Discarding unreadable session file"
                );
                Entries::new()
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Entries),
    {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut entries = self.load()?;
        change(&mut entries);
        self.store(&entries)
    }
}

impl SessionStorage for FileSession {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("moto-session-{}", Uuid::new_v4()))
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = scratch_dir();
        FileSession::new(&dir).set("user_id", "7").unwrap();

        let reopened = FileSession::new(&dir);
        assert_eq!(reopened.get("user_id").unwrap().as_deref(), Some("7"));

        reopened.clear().unwrap();
        assert!(reopened.get("user_id").unwrap().is_none());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = scratch_dir();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(SESSION_FILE), "{{{ not json").unwrap();

        let session = FileSession::new(&dir);
        assert!(session.get("cart").unwrap().is_none());

        session.set("cart", "[]").unwrap();
        assert_eq!(session.get("cart").unwrap().as_deref(), Some("[]"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_usable_from_a_blocking_task() {
        let dir = scratch_dir();
        let session = std::sync::Arc::new(FileSession::new(&dir));

        let writer = std::sync::Arc::clone(&session);
        tokio::task::spawn_blocking(move || writer.set("user_role", "customer"))
            .await
            .unwrap()
            .unwrap();

        let reader = std::sync::Arc::clone(&session);
        let role = tokio::task::spawn_blocking(move || reader.get("user_role"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(role.as_deref(), Some("customer"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_clear_without_file_is_ok() {
        let session = FileSession::new(scratch_dir());
        assert!(session.clear().is_ok());
        assert!(session.remove("cart").is_ok());
    }
}
