//! Authorization-related error types.
//!
//! These cover the failure modes of a single authorization attempt and of
//! the bookkeeping around it. Note that a malformed or denied result is
//! normally *not* returned as an error: the authorization client folds those
//! into a `TokenResult::Failure`. The variants below exist so the same
//! classification can travel through the unified [`LinkError`] when needed.
//!
//! [`LinkError`]: super::LinkError

use std::fmt;

/// Authorization-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// The raw result payload was missing or could not be parsed.
    MalformedResult { message: String },

    /// The authorization surface reported an error; `detail` is verbatim.
    AuthorizationDenied { detail: String },

    /// The user dismissed the consent prompt.
    UserCancelled,

    /// A result arrived for an attempt that is no longer in flight.
    StaleResult { attempt: u64 },

    /// The authorization surface refused to start the attempt.
    LaunchFailed { message: String },

    /// The music user token could not be persisted.
    TokenSaveFailed { message: String },

    /// The stored token could not be read or cleared.
    TokenStoreUnavailable { message: String },
}

impl AuthError {
    /// Check if another attempt by the user might succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AuthError::UserCancelled
                | AuthError::MalformedResult { .. }
                | AuthError::LaunchFailed { .. }
        )
    }

    /// Check if this error means the user is (still) not authorized.
    pub fn leaves_unauthorized(&self) -> bool {
        !matches!(self, AuthError::StaleResult { .. })
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::MalformedResult { .. } => {
                "The authorization result could not be read. Please try again.".to_string()
            }
            AuthError::AuthorizationDenied { detail } => {
                format!("Error getting token: {}", detail)
            }
            AuthError::UserCancelled => "Authorization was cancelled.".to_string(),
            AuthError::StaleResult { .. } => {
                "An outdated authorization result was ignored.".to_string()
            }
            AuthError::LaunchFailed { message } => {
                format!("Failed to start authorization: {}", message)
            }
            AuthError::TokenSaveFailed { .. } => {
                "Could not save your music user token. Please check file permissions.".to_string()
            }
            AuthError::TokenStoreUnavailable { .. } => {
                "Could not read your stored music user token.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MalformedResult { .. } => "E_AUTH_MALFORMED",
            AuthError::AuthorizationDenied { .. } => "E_AUTH_DENIED",
            AuthError::UserCancelled => "E_AUTH_CANCELLED",
            AuthError::StaleResult { .. } => "E_AUTH_STALE",
            AuthError::LaunchFailed { .. } => "E_AUTH_LAUNCH",
            AuthError::TokenSaveFailed { .. } => "E_AUTH_TOKEN_SAVE",
            AuthError::TokenStoreUnavailable { .. } => "E_AUTH_TOKEN_STORE",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MalformedResult { message } => {
                write!(f, "Malformed authorization result: {}", message)
            }
            AuthError::AuthorizationDenied { detail } => {
                write!(f, "Authorization denied: {}", detail)
            }
            AuthError::UserCancelled => write!(f, "Authorization cancelled by user"),
            AuthError::StaleResult { attempt } => {
                write!(f, "Stale authorization result for attempt {}", attempt)
            }
            AuthError::LaunchFailed { message } => {
                write!(f, "Failed to launch authorization: {}", message)
            }
            AuthError::TokenSaveFailed { message } => {
                write!(f, "Failed to save music user token: {}", message)
            }
            AuthError::TokenStoreUnavailable { message } => {
                write!(f, "Token store unavailable: {}", message)
            }
        }
    }
}

impl std::error::Error for AuthError {}
