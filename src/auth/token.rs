//! Music user token persistence.
//!
//! The token lives in `<data dir>/.user_token.json` (by default
//! `~/.musiclink/.user_token.json`) as a single named entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::{classify_io_error, SystemError};

/// The token file name.
pub const TOKEN_FILE: &str = ".user_token.json";

/// On-disk form of the stored music user token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredToken {
    pub music_user_token: String,
    pub stored_at: DateTime<Utc>,
}

impl StoredToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            music_user_token: token.into(),
            stored_at: Utc::now(),
        }
    }

    /// Empty tokens mean "not authorized".
    pub fn is_present(&self) -> bool {
        !self.music_user_token.is_empty()
    }
}

/// Errors from the token file.
#[derive(Debug, Error)]
pub enum TokenFileError {
    #[error(transparent)]
    System(#[from] SystemError),

    #[error("Invalid token file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads and writes the token file.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    /// Token file inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_FILE),
        }
    }

    /// Token file at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored token. A missing file or an empty token is `None`.
    pub fn load(&self) -> Result<Option<StoredToken>, TokenFileError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)
            .map_err(|e| classify_io_error(e, Some(self.path.clone()), "read"))?;
        let stored: StoredToken = serde_json::from_reader(BufReader::new(file))?;

        Ok(Some(stored).filter(StoredToken::is_present))
    }

    /// Overwrite the token file, creating the parent directory if needed.
    pub fn save(&self, token: &StoredToken) -> Result<(), TokenFileError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| SystemError::DirectoryCreationFailed {
                    path: parent.to_path_buf(),
                    message: e.to_string(),
                })?;
            }
        }

        let file = File::create(&self.path)
            .map_err(|e| classify_io_error(e, Some(self.path.clone()), "write"))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, token)?;
        writer
            .flush()
            .map_err(|e| classify_io_error(e, Some(self.path.clone()), "write"))?;
        Ok(())
    }

    /// Remove the token file. A missing file is fine.
    pub fn clear(&self) -> Result<(), TokenFileError> {
        if !self.path.exists() {
            return Ok(());
        }
        fs::remove_file(&self.path)
            .map_err(|e| classify_io_error(e, Some(self.path.clone()), "delete"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = TokenFile::in_dir(temp_dir.path());

        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_save_creates_parent_and_roundtrips() {
        let temp_dir = TempDir::new().unwrap();
        let file = TokenFile::in_dir(temp_dir.path().join("nested").join(".musiclink"));

        file.save(&StoredToken::new("abc123")).unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded.music_user_token, "abc123");
        assert!(file.path().ends_with(TOKEN_FILE));
    }

    #[test]
    fn test_last_write_wins() {
        let temp_dir = TempDir::new().unwrap();
        let file = TokenFile::in_dir(temp_dir.path());

        file.save(&StoredToken::new("first")).unwrap();
        file.save(&StoredToken::new("second")).unwrap();

        assert_eq!(file.load().unwrap().unwrap().music_user_token, "second");
    }

    #[test]
    fn test_empty_token_reads_as_absent() {
        let temp_dir = TempDir::new().unwrap();
        let file = TokenFile::in_dir(temp_dir.path());

        file.save(&StoredToken::new("")).unwrap();

        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_file_layout() {
        let temp_dir = TempDir::new().unwrap();
        let file = TokenFile::in_dir(temp_dir.path());
        file.save(&StoredToken::new("abc123")).unwrap();

        let raw = fs::read_to_string(file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["music_user_token"], "abc123");
        assert!(value["stored_at"].is_string());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = TokenFile::in_dir(temp_dir.path());
        fs::write(file.path(), "not json").unwrap();

        assert!(matches!(file.load(), Err(TokenFileError::Json(_))));
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let file = TokenFile::in_dir(temp_dir.path());

        file.clear().unwrap();
        file.save(&StoredToken::new("abc")).unwrap();
        file.clear().unwrap();

        assert!(!file.path().exists());
        assert!(file.load().unwrap().is_none());
    }
}
