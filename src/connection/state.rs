//! Connection lifecycle state.

use std::fmt;

/// Lifecycle state of the connection to the browsing service.
///
/// Owned by [`ConnectionManager`](super::ConnectionManager); consumers only
/// observe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection and no attempt in flight. Initial state.
    #[default]
    Disconnected,
    /// A connect cycle is in flight.
    Connecting,
    /// A live handle is held.
    Connected,
    /// The service reported that the connect attempt failed.
    ConnectionFailed,
    /// The service suspended an established connection.
    Suspended,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    /// True while a cycle is live (in flight or established).
    pub fn is_active(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Connected)
    }

    /// Check whether `next` is an edge of the lifecycle state machine.
    ///
    /// `disconnect` may leave any state; every other edge is listed
    /// explicitly.
    pub fn can_transition_to(&self, next: ConnectionState) -> bool {
        use ConnectionState::*;

        match (self, next) {
            (_, Disconnected) => true,
            (Disconnected | ConnectionFailed | Suspended, Connecting) => true,
            (Connecting, Connected) => true,
            (Connecting, ConnectionFailed) => true,
            (Connected, Suspended) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::ConnectionFailed => "connection-failed",
            ConnectionState::Suspended => "suspended",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of one connect attempt.
///
/// Each `connect()` that leaves an inactive state opens a new cycle. Every
/// callback from the browsing service names the cycle it belongs to so
/// late deliveries can be recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectCycle(pub u64);

impl fmt::Display for ConnectCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle-{}", self.0)
    }
}
