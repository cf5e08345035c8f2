//! Browsing-service trait abstraction.
//!
//! The browsing service is an opaque external capability. Starting a
//! connection returns immediately; the outcome arrives later as a
//! [`BrowserEvent`] tagged with the [`ConnectCycle`] it answers.

use serde::{Deserialize, Serialize};

use crate::connection::{ConnectCycle, ConnectionHandle};

/// Identifies the browsing service to connect to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub package: String,
    pub class: String,
}

impl ServiceDescriptor {
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            class: class.into(),
        }
    }
}

impl Default for ServiceDescriptor {
    fn default() -> Self {
        Self::new("com.apple.android.music", "com.apple.android.music.MediaBrowserService")
    }
}

impl std::fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.package, self.class)
    }
}

/// Callback from the browsing service for one connect cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEvent {
    Connected {
        cycle: ConnectCycle,
        handle: ConnectionHandle,
    },
    Suspended {
        cycle: ConnectCycle,
    },
    Failed {
        cycle: ConnectCycle,
    },
}

impl BrowserEvent {
    pub fn cycle(&self) -> ConnectCycle {
        match self {
            BrowserEvent::Connected { cycle, .. }
            | BrowserEvent::Suspended { cycle }
            | BrowserEvent::Failed { cycle } => *cycle,
        }
    }
}

/// Browsing-service operation errors.
#[derive(Debug, Clone)]
pub enum BrowserError {
    /// The service could not be reached at all.
    Unavailable(String),
}

impl std::fmt::Display for BrowserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowserError::Unavailable(msg) => write!(f, "Browsing service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for BrowserError {}

/// Trait for the outbound side of the browsing service.
///
/// Implementations must deliver at most one `Connected` or `Failed` per
/// cycle, and any `Suspended` strictly after that cycle's `Connected`.
pub trait BrowserService: Send {
    /// Start connecting. Completion is reported asynchronously.
    ///
    /// An `Err` means the attempt never started; no event will follow for
    /// `cycle`.
    fn connect(&mut self, service: &ServiceDescriptor, cycle: ConnectCycle)
        -> Result<(), BrowserError>;

    /// Release a handle previously delivered through `Connected`.
    fn disconnect(&mut self, handle: ConnectionHandle);
}
