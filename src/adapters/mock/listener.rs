//! Recording connection listener for testing.

use std::sync::{Arc, Mutex};

use crate::connection::{ConnectionHandle, ConnectionListener, ListenerError};

/// Appends `"<name>:<handle id>"` to a log on every connection.
///
/// Several listeners can share one log to check delivery order.
#[derive(Debug, Clone)]
pub struct RecordingListener {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingListener {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_log(mut self, log: Arc<Mutex<Vec<String>>>) -> Self {
        self.log = log;
        self
    }

    pub fn shared_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.log.clone()
    }
}

impl ConnectionListener for RecordingListener {
    fn on_connected(&mut self, handle: &ConnectionHandle) -> Result<(), ListenerError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.name, handle.id()));
        Ok(())
    }
}
