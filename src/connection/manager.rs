//! Connection manager for the browsing service.
//!
//! The manager is the only owner of [`ConnectionState`]. Visibility events
//! drive `connect`/`disconnect`; the browsing service answers through the
//! `on_*` callbacks, each tagged with the [`ConnectCycle`] it belongs to.
//! Callbacks for a cycle other than the current one are stale: a stale
//! `Connected` has its handle released on the spot and never reaches a
//! listener. Leaving `Connected` by any path tells every listener the handle
//! it was given is gone.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::listener::{ConnectionListener, ListenerError, ListenerId};
use super::{ConnectCycle, ConnectionHandle, ConnectionState};
use crate::error::ConnectionError;
use crate::traits::{BrowserEvent, BrowserService, ServiceDescriptor};

/// Owns the connection lifecycle and fans out establishment to listeners.
pub struct ConnectionManager<B> {
    browser: B,
    service: ServiceDescriptor,
    state: ConnectionState,
    state_tx: watch::Sender<ConnectionState>,
    handle: Option<ConnectionHandle>,
    cycle: Option<ConnectCycle>,
    next_cycle: u64,
    listeners: Vec<(ListenerId, Box<dyn ConnectionListener>)>,
    next_listener: u64,
}

impl<B: BrowserService> ConnectionManager<B> {
    pub fn new(browser: B, service: ServiceDescriptor) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            browser,
            service,
            state: ConnectionState::Disconnected,
            state_tx,
            handle: None,
            cycle: None,
            next_cycle: 1,
            listeners: Vec::new(),
            next_listener: 1,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The live handle, present only while `Connected`.
    pub fn live_handle(&self) -> Option<&ConnectionHandle> {
        self.handle.as_ref()
    }

    /// The cycle callbacks are currently accepted for.
    pub fn current_cycle(&self) -> Option<ConnectCycle> {
        self.cycle
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    /// Register a listener. Listeners are notified in registration order.
    pub fn add_listener(&mut self, listener: Box<dyn ConnectionListener>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        debug!("Registered connection {}", id);
        id
    }

    /// Unregister a listener. Returns false if the id was unknown.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        before != self.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Start a connect cycle.
    ///
    /// No-op while `Connecting` or `Connected`. From `ConnectionFailed` or
    /// `Suspended` this is the manual retry. Never fails: a service that
    /// refuses to start moves the manager to `ConnectionFailed`.
    pub fn connect(&mut self) {
        if self.state.is_active() {
            debug!("connect() ignored while {}", self.state);
            return;
        }

        let cycle = ConnectCycle(self.next_cycle);
        self.next_cycle += 1;
        self.cycle = Some(cycle);
        self.set_state(ConnectionState::Connecting);

        if let Err(e) = self.browser.connect(&self.service, cycle) {
            let err = ConnectionError::ServiceUnavailable {
                service: self.service.to_string(),
                message: e.to_string(),
            };
            warn!(code = err.error_code(), %cycle, "{}", err);
            self.cycle = None;
            self.set_state(ConnectionState::ConnectionFailed);
        }
    }

    /// Tear down any connection. Safe to call repeatedly.
    ///
    /// Invalidates the current cycle so a late `Connected` is discarded.
    pub fn disconnect(&mut self) {
        if self.state == ConnectionState::Disconnected {
            debug!("disconnect() while already disconnected");
            return;
        }

        self.cycle = None;
        if let Some(handle) = self.handle.take() {
            debug!("Releasing {}", handle);
            self.browser.disconnect(handle);
        }
        self.set_state(ConnectionState::Disconnected);
    }

    /// Dispatch a browsing-service callback.
    pub fn handle_event(&mut self, event: BrowserEvent) {
        match event {
            BrowserEvent::Connected { cycle, handle } => self.on_connected(cycle, handle),
            BrowserEvent::Suspended { cycle } => self.on_connection_suspended(cycle),
            BrowserEvent::Failed { cycle } => self.on_connection_failed(cycle),
        }
    }

    /// The service established the connection for `cycle`.
    pub fn on_connected(&mut self, cycle: ConnectCycle, handle: ConnectionHandle) {
        if !self.is_current(cycle) || self.state != ConnectionState::Connecting {
            warn!(
                %cycle,
                state = %self.state,
                "Discarding stale connection; releasing {}",
                handle
            );
            self.browser.disconnect(handle);
            return;
        }

        info!(%cycle, "Connected to {} with {}", self.service, handle);
        self.handle = Some(handle.clone());
        self.set_state(ConnectionState::Connected);

        let failures = self.notify_connected(&handle);
        if !failures.is_empty() {
            debug!(
                "{} of {} listener(s) failed on connect",
                failures.len(),
                self.listeners.len()
            );
        }
    }

    /// The service suspended the connection established in `cycle`.
    pub fn on_connection_suspended(&mut self, cycle: ConnectCycle) {
        if !self.is_current(cycle) || self.state != ConnectionState::Connected {
            debug!(%cycle, state = %self.state, "Ignoring suspended callback");
            return;
        }

        let err = ConnectionError::ConnectionSuspended {
            service: self.service.to_string(),
        };
        warn!(code = err.error_code(), %cycle, "{}", err);

        self.cycle = None;
        if let Some(handle) = self.handle.take() {
            self.browser.disconnect(handle);
        }
        self.set_state(ConnectionState::Suspended);
    }

    /// The service could not establish `cycle`.
    pub fn on_connection_failed(&mut self, cycle: ConnectCycle) {
        if !self.is_current(cycle) || self.state != ConnectionState::Connecting {
            debug!(%cycle, state = %self.state, "Ignoring failed callback");
            return;
        }

        let err = ConnectionError::ConnectionFailed {
            service: self.service.to_string(),
            reason: "reported by browsing service".to_string(),
        };
        warn!(code = err.error_code(), %cycle, "{}", err);

        self.cycle = None;
        self.handle = None;
        self.set_state(ConnectionState::ConnectionFailed);
    }

    fn is_current(&self, cycle: ConnectCycle) -> bool {
        self.cycle == Some(cycle)
    }

    fn set_state(&mut self, next: ConnectionState) {
        if self.state == next {
            return;
        }
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        info!("Connection state: {} -> {}", self.state, next);
        let was_connected = self.state.is_connected();
        self.state = next;
        self.state_tx.send_replace(next);

        if was_connected {
            self.notify_disconnected();
        }
    }

    /// Deliver `handle` to every listener, isolating failures per listener.
    fn notify_connected(&mut self, handle: &ConnectionHandle) -> Vec<ConnectionError> {
        self.notify(|listener| listener.on_connected(handle))
    }

    fn notify_disconnected(&mut self) {
        let failures = self.notify(|listener| listener.on_disconnected());
        if !failures.is_empty() {
            debug!("{} listener(s) failed on disconnect", failures.len());
        }
    }

    fn notify<F>(&mut self, mut hook: F) -> Vec<ConnectionError>
    where
        F: FnMut(&mut dyn ConnectionListener) -> Result<(), ListenerError>,
    {
        let mut failures = Vec::new();

        for (id, listener) in self.listeners.iter_mut() {
            let outcome = catch_unwind(AssertUnwindSafe(|| hook(listener.as_mut())));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic) => panic_message(panic.as_ref()),
            };

            let err = ConnectionError::ListenerFailed {
                listener: id.0,
                message,
            };
            warn!(code = err.error_code(), "{}", err);
            failures.push(err);
        }

        failures
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::adapters::mock::{MockBrowserService, RecordingListener};

    fn manager() -> ConnectionManager<MockBrowserService> {
        ConnectionManager::new(MockBrowserService::new(), ServiceDescriptor::default())
    }

    fn connected(m: &mut ConnectionManager<MockBrowserService>, id: u64) -> ConnectCycle {
        m.connect();
        let cycle = m.current_cycle().unwrap();
        m.on_connected(cycle, ConnectionHandle::new(id, "root"));
        cycle
    }

    struct FailingListener;

    impl ConnectionListener for FailingListener {
        fn on_connected(&mut self, _: &ConnectionHandle) -> Result<(), ListenerError> {
            Err("surface not attached".into())
        }
    }

    struct PanickingListener;

    impl ConnectionListener for PanickingListener {
        fn on_connected(&mut self, _: &ConnectionHandle) -> Result<(), ListenerError> {
            panic!("listener bug");
        }
    }

    /// Panics on its first connection, records every later one.
    #[derive(Default)]
    struct FlakyListener {
        calls: usize,
        seen: Vec<u64>,
        disconnects: usize,
    }

    impl ConnectionListener for FlakyListener {
        fn on_connected(&mut self, handle: &ConnectionHandle) -> Result<(), ListenerError> {
            self.calls += 1;
            if self.calls == 1 {
                panic!("first connection bug");
            }
            self.seen.push(handle.id());
            Ok(())
        }

        fn on_disconnected(&mut self) -> Result<(), ListenerError> {
            self.disconnects += 1;
            Ok(())
        }
    }

    #[test]
    fn test_connect_moves_to_connecting() {
        let mut m = manager();
        m.connect();

        assert_eq!(m.state(), ConnectionState::Connecting);
        assert_eq!(m.browser().connect_calls(), vec![ConnectCycle(1)]);
    }

    #[test]
    fn test_connect_is_idempotent_while_active() {
        let mut m = manager();
        m.connect();
        m.connect();
        assert_eq!(m.browser().connect_calls().len(), 1);

        m.on_connected(ConnectCycle(1), ConnectionHandle::new(1, "root"));
        m.connect();
        assert_eq!(m.browser().connect_calls().len(), 1);
        assert_eq!(m.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_connected_notifies_listeners_in_order() {
        let mut m = manager();
        let first = RecordingListener::new("first");
        let second = RecordingListener::new("second");
        let log = first.shared_log();
        let second = second.with_log(log.clone());
        m.add_listener(Box::new(first));
        m.add_listener(Box::new(second));

        connected(&mut m, 7);

        assert_eq!(m.state(), ConnectionState::Connected);
        assert_eq!(m.live_handle().map(|h| h.id()), Some(7));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:7".to_string(), "second:7".to_string()]
        );
    }

    #[test]
    fn test_listener_failures_are_isolated() {
        let mut m = manager();
        let recorder = RecordingListener::new("after");
        let log = recorder.shared_log();
        m.add_listener(Box::new(FailingListener));
        m.add_listener(Box::new(PanickingListener));
        m.add_listener(Box::new(recorder));

        connected(&mut m, 1);

        assert_eq!(*log.lock().unwrap(), vec!["after:1".to_string()]);
        assert_eq!(m.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_shared_listener_survives_panic_while_locked() {
        let mut m = manager();
        let shared = Arc::new(Mutex::new(FlakyListener::default()));
        m.add_listener(Box::new(shared.clone()));

        connected(&mut m, 1);
        assert!(shared.is_poisoned());

        m.disconnect();
        connected(&mut m, 2);

        let listener = shared.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(listener.seen, vec![2]);
        assert_eq!(listener.disconnects, 1);
    }

    #[test]
    fn test_leaving_connected_notifies_listeners() {
        let mut m = manager();
        let shared = Arc::new(Mutex::new(FlakyListener {
            calls: 1,
            ..Default::default()
        }));
        m.add_listener(Box::new(shared.clone()));

        let cycle = connected(&mut m, 1);
        m.on_connection_suspended(cycle);
        assert_eq!(shared.lock().unwrap().disconnects, 1);

        connected(&mut m, 2);
        m.disconnect();
        assert_eq!(shared.lock().unwrap().disconnects, 2);

        m.connect();
        m.disconnect();
        assert_eq!(shared.lock().unwrap().disconnects, 2);
    }

    #[test]
    fn test_disconnect_while_connecting_discards_late_connected() {
        let mut m = manager();
        let recorder = RecordingListener::new("l");
        let log = recorder.shared_log();
        m.add_listener(Box::new(recorder));

        m.connect();
        m.disconnect();
        m.on_connected(ConnectCycle(1), ConnectionHandle::new(9, "root"));

        assert_eq!(m.state(), ConnectionState::Disconnected);
        assert!(m.live_handle().is_none());
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(m.browser().released_ids(), vec![9]);
    }

    #[test]
    fn test_stale_cycle_after_reconnect_is_released() {
        let mut m = manager();
        m.connect();
        m.disconnect();
        m.connect();

        m.on_connected(ConnectCycle(1), ConnectionHandle::new(1, "root"));
        assert_eq!(m.state(), ConnectionState::Connecting);
        assert_eq!(m.browser().released_ids(), vec![1]);

        m.on_connected(ConnectCycle(2), ConnectionHandle::new(2, "root"));
        assert_eq!(m.state(), ConnectionState::Connected);
        assert_eq!(m.live_handle().map(|h| h.id()), Some(2));
    }

    #[test]
    fn test_disconnect_twice_is_noop() {
        let mut m = manager();
        let mut rx = m.subscribe();

        m.disconnect();
        m.disconnect();

        assert_eq!(m.state(), ConnectionState::Disconnected);
        assert!(!rx.has_changed().unwrap());
        assert!(m.browser().released_ids().is_empty());
    }

    #[test]
    fn test_disconnect_releases_live_handle() {
        let mut m = manager();
        connected(&mut m, 3);

        m.disconnect();
        m.disconnect();

        assert_eq!(m.state(), ConnectionState::Disconnected);
        assert_eq!(m.browser().released_ids(), vec![3]);
    }

    #[test]
    fn test_suspend_invalidates_handle() {
        let mut m = manager();
        let cycle = connected(&mut m, 4);

        m.on_connection_suspended(cycle);

        assert_eq!(m.state(), ConnectionState::Suspended);
        assert!(m.live_handle().is_none());
        assert_eq!(m.browser().released_ids(), vec![4]);
    }

    #[test]
    fn test_failed_then_manual_retry() {
        let mut m = manager();
        m.connect();
        m.on_connection_failed(ConnectCycle(1));
        assert_eq!(m.state(), ConnectionState::ConnectionFailed);

        m.connect();
        assert_eq!(m.state(), ConnectionState::Connecting);
        m.on_connected(ConnectCycle(2), ConnectionHandle::new(2, "root"));
        assert_eq!(m.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_invalid_callbacks_are_ignored() {
        let mut m = manager();
        m.on_connection_suspended(ConnectCycle(1));
        m.on_connection_failed(ConnectCycle(1));
        assert_eq!(m.state(), ConnectionState::Disconnected);

        let cycle = connected(&mut m, 1);
        m.on_connection_failed(cycle);
        assert_eq!(m.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_refused_connect_becomes_failed() {
        let mut m = manager();
        m.browser().set_connect_should_fail(true);

        m.connect();

        assert_eq!(m.state(), ConnectionState::ConnectionFailed);
        assert!(m.current_cycle().is_none());
    }

    #[test]
    fn test_subscribe_observes_transitions() {
        let mut m = manager();
        let rx = m.subscribe();

        connected(&mut m, 1);

        assert_eq!(*rx.borrow(), ConnectionState::Connected);
    }

    #[test]
    fn test_remove_listener() {
        let mut m = manager();
        let recorder = RecordingListener::new("gone");
        let log = recorder.shared_log();
        let id = m.add_listener(Box::new(recorder));

        assert!(m.remove_listener(id));
        assert!(!m.remove_listener(id));
        connected(&mut m, 1);

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(m.listener_count(), 0);
    }
}
