//! In-process browsing service for the reference client.
//!
//! Answers every connect after a short delay by posting a `BrowserEvent`
//! onto the session channel, the way a real service calls back on the
//! event loop. It can be told to fail or suspend to exercise the other
//! paths of the lifecycle.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::connection::{ConnectCycle, ConnectionHandle};
use crate::session::SessionEvent;
use crate::traits::{BrowserError, BrowserEvent, BrowserService, ServiceDescriptor};

/// Delay before a connect is answered.
pub const DEFAULT_CONNECT_DELAY: Duration = Duration::from_millis(50);

pub struct LoopbackBrowserService {
    events: mpsc::UnboundedSender<SessionEvent>,
    root_id: String,
    delay: Duration,
    next_handle: Arc<AtomicU64>,
    fail_next: Arc<AtomicBool>,
    live: HashSet<u64>,
}

impl LoopbackBrowserService {
    pub fn new(events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            events,
            root_id: "root".to_string(),
            delay: DEFAULT_CONNECT_DELAY,
            next_handle: Arc::new(AtomicU64::new(1)),
            fail_next: Arc::new(AtomicBool::new(false)),
            live: HashSet::new(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_root_id(mut self, root_id: impl Into<String>) -> Self {
        self.root_id = root_id.into();
        self
    }

    /// Answer the next connect with `Failed`.
    pub fn fail_next_connect(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Post a suspension for `cycle`, as if the service went away.
    pub fn suspend(&self, cycle: ConnectCycle) {
        let _ = self
            .events
            .send(SessionEvent::Browser(BrowserEvent::Suspended { cycle }));
    }

    /// Handles delivered and not yet released.
    pub fn live_handles(&self) -> usize {
        self.live.len()
    }
}

impl BrowserService for LoopbackBrowserService {
    fn connect(
        &mut self,
        service: &ServiceDescriptor,
        cycle: ConnectCycle,
    ) -> Result<(), BrowserError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| BrowserError::Unavailable(e.to_string()))?;

        let event = if self.fail_next.swap(false, Ordering::SeqCst) {
            BrowserEvent::Failed { cycle }
        } else {
            let id = self.next_handle.fetch_add(1, Ordering::SeqCst);
            self.live.insert(id);
            BrowserEvent::Connected {
                cycle,
                handle: ConnectionHandle::new(id, self.root_id.clone()),
            }
        };

        debug!(%cycle, "Loopback connecting to {}", service);
        let events = self.events.clone();
        let delay = self.delay;
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(SessionEvent::Browser(event));
        });
        Ok(())
    }

    fn disconnect(&mut self, handle: ConnectionHandle) {
        debug!("Loopback released {}", handle);
        self.live.remove(&handle.id());
    }
}
