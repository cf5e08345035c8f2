//! Unified error type for the musiclink client.

use std::fmt;

use super::auth::AuthError;
use super::category::ErrorCategory;
use super::config::ConfigError;
use super::connection::ConnectionError;
use super::context::ErrorContext;
use super::system::SystemError;

/// Unified error type for the musiclink client.
///
/// `LinkError` consolidates the domain-specific error types so callers at the
/// edges (the binary, the session loop) can log and present any failure the
/// same way.
#[derive(Debug)]
pub enum LinkError {
    /// Browsing-service connection errors.
    Connection(ConnectionError),

    /// Authorization errors.
    Auth(AuthError),

    /// Configuration errors.
    Config(ConfigError),

    /// System/filesystem errors.
    System(SystemError),

    /// Wrapped error with additional context.
    WithContext {
        error: Box<LinkError>,
        context: ErrorContext,
    },
}

impl LinkError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            LinkError::Connection(ConnectionError::ListenerFailed { .. }) => ErrorCategory::Client,
            LinkError::Connection(_) => ErrorCategory::Connection,
            LinkError::Auth(err) => match err {
                AuthError::UserCancelled => ErrorCategory::User,
                AuthError::StaleResult { .. } => ErrorCategory::Client,
                AuthError::TokenSaveFailed { .. } | AuthError::TokenStoreUnavailable { .. } => {
                    ErrorCategory::System
                }
                _ => ErrorCategory::Auth,
            },
            LinkError::Config(_) => ErrorCategory::Configuration,
            LinkError::System(_) => ErrorCategory::System,
            LinkError::WithContext { error, .. } => error.category(),
        }
    }

    /// Check if a later manual attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            LinkError::Connection(err) => err.is_transient(),
            LinkError::Auth(err) => err.is_recoverable(),
            LinkError::Config(_) => false,
            LinkError::System(err) => err.is_transient(),
            LinkError::WithContext { error, .. } => error.is_retryable(),
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            LinkError::Connection(err) => err.user_message(),
            LinkError::Auth(err) => err.user_message(),
            LinkError::Config(err) => err.user_message(),
            LinkError::System(err) => err.user_message(),
            LinkError::WithContext { error, context } => {
                format!("{}\n\nContext: {}", error.user_message(), context)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            LinkError::Connection(err) => err.error_code(),
            LinkError::Auth(err) => err.error_code(),
            LinkError::Config(err) => err.error_code(),
            LinkError::System(err) => err.error_code(),
            LinkError::WithContext { error, .. } => error.error_code(),
        }
    }

    /// Attach context to this error.
    pub fn with_context(self, ctx: ErrorContext) -> Self {
        LinkError::WithContext {
            error: Box::new(self),
            context: ctx,
        }
    }

    /// Get the context if this error has one attached.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            LinkError::WithContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get the inner error without context.
    pub fn inner(&self) -> &LinkError {
        match self {
            LinkError::WithContext { error, .. } => error.inner(),
            _ => self,
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Connection(err) => write!(f, "{}", err),
            LinkError::Auth(err) => write!(f, "{}", err),
            LinkError::Config(err) => write!(f, "{}", err),
            LinkError::System(err) => write!(f, "{}", err),
            LinkError::WithContext { error, context } => {
                write!(f, "{} ({})", error, context)
            }
        }
    }
}

impl std::error::Error for LinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LinkError::Connection(err) => Some(err),
            LinkError::Auth(err) => Some(err),
            LinkError::Config(err) => Some(err),
            LinkError::System(err) => Some(err),
            LinkError::WithContext { error, .. } => error.source(),
        }
    }
}

impl From<ConnectionError> for LinkError {
    fn from(err: ConnectionError) -> Self {
        LinkError::Connection(err)
    }
}

impl From<AuthError> for LinkError {
    fn from(err: AuthError) -> Self {
        LinkError::Auth(err)
    }
}

impl From<ConfigError> for LinkError {
    fn from(err: ConfigError) -> Self {
        LinkError::Config(err)
    }
}

impl From<SystemError> for LinkError {
    fn from(err: SystemError) -> Self {
        LinkError::System(err)
    }
}

impl From<std::io::Error> for LinkError {
    fn from(err: std::io::Error) -> Self {
        use super::system::classify_io_error;
        LinkError::System(classify_io_error(err, None, "I/O operation"))
    }
}
