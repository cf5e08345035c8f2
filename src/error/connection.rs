//! Connection-related error types.
//!
//! The connection manager never returns these across its public boundary;
//! they describe *why* a state transition happened and are logged, attached
//! to state observers, or reported when a listener misbehaves.

use std::fmt;

/// Connection-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionError {
    /// The browsing service reported that the connection attempt failed.
    ConnectionFailed { service: String, reason: String },

    /// The browsing service suspended an established connection.
    ConnectionSuspended { service: String },

    /// A registered listener returned an error or panicked.
    ListenerFailed { listener: u64, message: String },

    /// The browsing service refused to start a connection.
    ServiceUnavailable { service: String, message: String },
}

impl ConnectionError {
    /// Check if a later `connect()` may succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, ConnectionError::ListenerFailed { .. })
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ConnectionError::ConnectionFailed { service, .. } => {
                format!("Could not connect to {}.", service)
            }
            ConnectionError::ConnectionSuspended { service } => {
                format!("The connection to {} was suspended.", service)
            }
            ConnectionError::ListenerFailed { .. } => {
                "A view failed to handle the new connection.".to_string()
            }
            ConnectionError::ServiceUnavailable { service, .. } => {
                format!("{} is not available.", service)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConnectionError::ConnectionFailed { .. } => "E_CONN_FAILED",
            ConnectionError::ConnectionSuspended { .. } => "E_CONN_SUSPENDED",
            ConnectionError::ListenerFailed { .. } => "E_CONN_LISTENER",
            ConnectionError::ServiceUnavailable { .. } => "E_CONN_UNAVAILABLE",
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectionFailed { service, reason } => {
                write!(f, "Connection to '{}' failed: {}", service, reason)
            }
            ConnectionError::ConnectionSuspended { service } => {
                write!(f, "Connection to '{}' suspended", service)
            }
            ConnectionError::ListenerFailed { listener, message } => {
                write!(f, "Listener {} failed: {}", listener, message)
            }
            ConnectionError::ServiceUnavailable { service, message } => {
                write!(f, "Service '{}' unavailable: {}", service, message)
            }
        }
    }
}

impl std::error::Error for ConnectionError {}
