//! Error category classification for unified error handling.
//!
//! Categories group the domain errors so callers can decide how to react
//! (surface as state, prompt the user, fix configuration) without matching
//! on every variant.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Browsing-service connection problems (failed, suspended).
    /// Transient, but never retried automatically.
    Connection,

    /// Authorization problems reported by the authorization surface.
    Auth,

    /// Client-side errors (stale deliveries, invalid state, listener bugs).
    Client,

    /// User action required (cancelled consent, missing subscription).
    User,

    /// System/OS errors (filesystem, permissions).
    System,

    /// Configuration errors (missing developer token, unreadable config).
    /// Fatal to the attempt until the configuration is corrected.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if a later manual attempt has a reasonable chance to succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Connection | ErrorCategory::User)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Connection => "connection",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Client => "client",
            ErrorCategory::User => "user",
            ErrorCategory::System => "system",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns a user-friendly description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Connection => "Media browser connection issue",
            ErrorCategory::Auth => "Authorization problem",
            ErrorCategory::Client => "Application error",
            ErrorCategory::User => "User action required",
            ErrorCategory::System => "System error",
            ErrorCategory::Configuration => "Configuration problem",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Connection => "Bring the app to the foreground to reconnect",
            ErrorCategory::Auth => "Try signing out and authorizing again",
            ErrorCategory::Client => "This may be a bug. Please report this issue if it persists",
            ErrorCategory::User => "Complete the authorization prompt and try again",
            ErrorCategory::System => "Check file permissions and available disk space",
            ErrorCategory::Configuration => "Check your developer token and configuration settings",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
