//! File-based token store adapter.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::auth::{StoredToken, TokenFile, TokenFileError};
use crate::error::SystemError;
use crate::traits::{TokenStore, TokenStoreError};

/// File-based token store.
///
/// Wraps [`TokenFile`] and implements [`TokenStore`]. The token is stored
/// in `~/.musiclink/.user_token.json` unless another data directory is
/// configured.
///
/// # Example
///
/// ```ignore
/// use musiclink::adapters::FileTokenStore;
/// use musiclink::traits::TokenStore;
///
/// let store = FileTokenStore::new()?;
/// store.set("abc123").await?;
/// assert_eq!(store.get().await?.as_deref(), Some("abc123"));
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    file: TokenFile,
}

impl FileTokenStore {
    /// Store in the default data directory.
    pub fn new() -> Result<Self, SystemError> {
        let dir = crate::config::default_data_dir()?;
        Ok(Self::in_dir(dir))
    }

    /// Store in `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            file: TokenFile::in_dir(dir),
        }
    }

    /// Store at an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            file: TokenFile::at(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

fn store_error(err: TokenFileError, wrap: fn(String) -> TokenStoreError) -> TokenStoreError {
    match err {
        TokenFileError::Json(e) => TokenStoreError::Serialization(e.to_string()),
        TokenFileError::System(e) => wrap(e.to_string()),
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self) -> Result<Option<String>, TokenStoreError> {
        let stored = self
            .file
            .load()
            .map_err(|e| store_error(e, TokenStoreError::LoadFailed))?;
        Ok(stored.map(|s| s.music_user_token))
    }

    async fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        self.file
            .save(&StoredToken::new(token))
            .map_err(|e| store_error(e, TokenStoreError::SaveFailed))
    }

    async fn clear(&self) -> Result<(), TokenStoreError> {
        self.file
            .clear()
            .map_err(|e| store_error(e, TokenStoreError::ClearFailed))
    }
}
