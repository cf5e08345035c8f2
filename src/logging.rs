//! Tracing setup for the reference client.
//!
//! Logs go to a file in the data directory so they never interleave with
//! the command loop on stdout.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{classify_io_error, SystemError};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "musiclink=info";

/// Build the filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a global subscriber appending to `log_path`.
pub fn init_file_logging(log_path: &Path) -> Result<(), SystemError> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).map_err(|e| SystemError::DirectoryCreationFailed {
            path: parent.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| classify_io_error(e, Some(log_path.to_path_buf()), "open log file"))?;

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_env_filter(env_filter())
        .try_init();

    Ok(())
}
