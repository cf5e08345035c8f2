//! Listener hooks fanned out by the connection manager.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use super::ConnectionHandle;

/// Error type returned by a listener hook.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Registration token returned by `add_listener`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Consumer of connection establishment.
///
/// The handle is shared read-only; a listener must never release it.
pub trait ConnectionListener: Send {
    fn on_connected(&mut self, handle: &ConnectionHandle) -> Result<(), ListenerError>;

    /// The handle last passed to `on_connected` has been released.
    fn on_disconnected(&mut self) -> Result<(), ListenerError> {
        Ok(())
    }
}

/// Shared listeners, so the owner keeps access to the listener it registered.
///
/// A poisoned lock is recovered: one panicking hook must not cut the
/// listener off from every later cycle.
impl<T: ConnectionListener> ConnectionListener for Arc<Mutex<T>> {
    fn on_connected(&mut self, handle: &ConnectionHandle) -> Result<(), ListenerError> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_connected(handle)
    }

    fn on_disconnected(&mut self) -> Result<(), ListenerError> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_disconnected()
    }
}
