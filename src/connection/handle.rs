//! Opaque handle to a live browsing-service connection.

use std::fmt;

/// Capability representing a live connection to the browsing service.
///
/// Only valid while the manager is `Connected`. Listeners receive it by
/// reference and may keep a clone for reads, but must re-fetch it after a
/// reconnect. Releasing it is the manager's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionHandle {
    id: u64,
    root_id: String,
}

impl ConnectionHandle {
    pub fn new(id: u64, root_id: impl Into<String>) -> Self {
        Self {
            id,
            root_id: root_id.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Root node of the service's content tree.
    pub fn root_id(&self) -> &str {
        &self.root_id
    }
}

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle#{} (root {})", self.id, self.root_id)
    }
}
