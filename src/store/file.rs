//! File-backed key-value storage.
//!
//! Stores each key as a file in a directory.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::GateError;

use super::DurableStore;

/// File-backed [`DurableStore`].
///
/// Each key is stored as `{key}.kv` in the configured directory. Keys are
/// restricted to alphanumerics, `_`, `-` and `.` to prevent path
/// traversal; a read with an invalid key returns `None`, a write fails.
///
/// # Example
///
/// ```rust,ignore
/// use gatehouse::store::FileStore;
///
/// let store = FileStore::new("/var/lib/myapp/gate")?;
/// ```
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Creates a new file store, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, GateError> {
        let dir = directory.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            GateError::StorageUnavailable(format!("Failed to create store directory: {e}"))
        })?;
        Ok(Self { directory: dir })
    }

    fn is_safe_key(key: &str) -> bool {
        !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.kv"))
    }
}

#[async_trait]
impl DurableStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, GateError> {
        if !Self::is_safe_key(key) {
            return Ok(None);
        }

        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| GateError::StorageUnavailable(format!("Failed to read key file: {e}")))
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), GateError> {
        if !Self::is_safe_key(key) {
            return Err(GateError::StorageUnavailable(format!(
                "Refusing unsafe store key: {key:?}"
            )));
        }

        std::fs::write(self.key_path(key), value)
            .map_err(|e| GateError::StorageUnavailable(format!("Failed to write key file: {e}")))
    }

    async fn remove(&self, key: &str) -> Result<(), GateError> {
        if !Self::is_safe_key(key) {
            return Ok(());
        }

        let path = self.key_path(key);
        if !path.exists() {
            return Ok(());
        }

        std::fs::remove_file(&path)
            .map_err(|e| GateError::StorageUnavailable(format!("Failed to remove key file: {e}")))
    }
}
