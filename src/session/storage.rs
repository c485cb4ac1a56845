//! Session Storage
//!
//! Single-slot stores for the admin session record.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::{OAuthFlowError, StorageError};
use crate::types::SessionRecord;

/// Storage key of the persisted session.
pub const SESSION_STORAGE_KEY: &str = "zoho_admin_session";

/// Session store interface.
///
/// A store holds at most one record; saving replaces any existing one.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist the session, replacing any existing one.
    async fn save(&self, record: SessionRecord) -> Result<(), OAuthFlowError>;

    /// Load the current session.
    async fn load(&self) -> Result<Option<SessionRecord>, OAuthFlowError>;

    /// Remove the session. Returns whether one existed.
    async fn clear(&self) -> Result<bool, OAuthFlowError>;

    /// Check for an unexpired admin session.
    async fn is_authenticated(&self) -> Result<bool, OAuthFlowError> {
        Ok(self
            .load()
            .await?
            .map(|record| record.is_admin() && !record.is_expired())
            .unwrap_or(false))
    }
}

/// In-memory session store.
#[derive(Default)]
pub struct InMemorySessionStore {
    record: Mutex<Option<SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, record: SessionRecord) -> Result<(), OAuthFlowError> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(record);
        Ok(())
    }

    async fn load(&self) -> Result<Option<SessionRecord>, OAuthFlowError> {
        Ok(self
            .record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn clear(&self) -> Result<bool, OAuthFlowError> {
        Ok(self
            .record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some())
    }
}

/// Session store persisted as a JSON file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store at an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/zoho_admin_session.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", SESSION_STORAGE_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save(&self, record: SessionRecord) -> Result<(), OAuthFlowError> {
        let json = serde_json::to_vec_pretty(&record).map_err(|e| StorageError::WriteFailed {
            message: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::WriteFailed {
                    message: format!("{}: {}", parent.display(), e),
                })?;
        }

        // Write then rename so readers never observe a partial record.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StorageError::WriteFailed {
                message: format!("{}: {}", tmp.display(), e),
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::WriteFailed {
                message: format!("{}: {}", self.path.display(), e),
            })?;

        Ok(())
    }

    async fn load(&self) -> Result<Option<SessionRecord>, OAuthFlowError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    message: format!("{}: {}", self.path.display(), e),
                }
                .into())
            }
        };

        let record = serde_json::from_slice(&bytes).map_err(|e| StorageError::CorruptedData {
            message: e.to_string(),
        })?;
        Ok(Some(record))
    }

    async fn clear(&self) -> Result<bool, OAuthFlowError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed {
                message: format!("{}: {}", self.path.display(), e),
            }
            .into()),
        }
    }
}

/// Mock session store for testing.
#[derive(Default)]
pub struct MockSessionStore {
    record: Mutex<Option<SessionRecord>>,
    save_history: Mutex<Vec<SessionRecord>>,
    clear_count: Mutex<usize>,
    should_fail: Mutex<bool>,
}

impl MockSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail.
    pub fn set_should_fail(&self, should_fail: bool) -> &Self {
        *self.should_fail.lock().unwrap_or_else(PoisonError::into_inner) = should_fail;
        self
    }

    pub fn get_save_history(&self) -> Vec<SessionRecord> {
        self.save_history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_count(&self) -> usize {
        *self.clear_count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_error(&self) -> Result<(), OAuthFlowError> {
        if *self.should_fail.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(StorageError::WriteFailed {
                message: "Mock storage failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn save(&self, record: SessionRecord) -> Result<(), OAuthFlowError> {
        self.check_error()?;
        self.save_history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(record);
        Ok(())
    }

    async fn load(&self) -> Result<Option<SessionRecord>, OAuthFlowError> {
        self.check_error()?;
        Ok(self
            .record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn clear(&self) -> Result<bool, OAuthFlowError> {
        self.check_error()?;
        *self.clear_count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(self
            .record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some())
    }
}
