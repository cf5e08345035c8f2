//! Mock browsing service for testing.
//!
//! Records every `connect` and `disconnect`; tests then play the service's
//! part by calling the manager's callbacks themselves.

use std::sync::{Arc, Mutex};

use crate::connection::{ConnectCycle, ConnectionHandle};
use crate::traits::{BrowserError, BrowserService, ServiceDescriptor};

#[derive(Debug, Clone, Default)]
pub struct MockBrowserService {
    connects: Arc<Mutex<Vec<ConnectCycle>>>,
    released: Arc<Mutex<Vec<ConnectionHandle>>>,
    connect_should_fail: Arc<Mutex<bool>>,
}

impl MockBrowserService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `connect` calls refuse to start.
    pub fn set_connect_should_fail(&self, should_fail: bool) {
        *self.connect_should_fail.lock().unwrap() = should_fail;
    }

    /// Cycles passed to `connect`, in order.
    pub fn connect_calls(&self) -> Vec<ConnectCycle> {
        self.connects.lock().unwrap().clone()
    }

    pub fn last_cycle(&self) -> Option<ConnectCycle> {
        self.connects.lock().unwrap().last().copied()
    }

    /// Handles passed to `disconnect`, in order.
    pub fn released(&self) -> Vec<ConnectionHandle> {
        self.released.lock().unwrap().clone()
    }

    pub fn released_ids(&self) -> Vec<u64> {
        self.released().iter().map(ConnectionHandle::id).collect()
    }
}

impl BrowserService for MockBrowserService {
    fn connect(
        &mut self,
        _service: &ServiceDescriptor,
        cycle: ConnectCycle,
    ) -> Result<(), BrowserError> {
        if *self.connect_should_fail.lock().unwrap() {
            return Err(BrowserError::Unavailable("Mock connect failure".to_string()));
        }
        self.connects.lock().unwrap().push(cycle);
        Ok(())
    }

    fn disconnect(&mut self, handle: ConnectionHandle) {
        self.released.lock().unwrap().push(handle);
    }
}
