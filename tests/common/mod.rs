//! Common test utilities for integration tests.
//!
//! Builds connection managers, authorization clients and sessions wired to
//! the mock adapters, and plays the browsing service's part.

pub mod mocks;

pub use mocks::*;

use musiclink::auth::AuthClient;
use musiclink::connection::{ConnectionHandle, ConnectionManager};
use musiclink::navigation::Router;
use musiclink::session::{Session, SessionEvent};
use musiclink::traits::{BrowserEvent, ServiceDescriptor};

pub const TEST_DEVELOPER_TOKEN: &str = "test-developer-token";

pub type TestManager = ConnectionManager<MockBrowserService>;
pub type TestAuthClient = AuthClient<MockAuthorizationSurface, InMemoryTokenStore>;
pub type TestSession = Session<MockBrowserService, MockAuthorizationSurface, InMemoryTokenStore>;

/// A manager over a fresh mock browser. The returned mock shares state with
/// the one inside the manager.
pub fn test_manager() -> (TestManager, MockBrowserService) {
    let browser = MockBrowserService::new();
    let manager = ConnectionManager::new(browser.clone(), ServiceDescriptor::default());
    (manager, browser)
}

pub fn test_auth_client(store: InMemoryTokenStore) -> (TestAuthClient, MockAuthorizationSurface) {
    let surface = MockAuthorizationSurface::new();
    let client = AuthClient::new(surface.clone(), store, TEST_DEVELOPER_TOKEN);
    (client, surface)
}

/// A started session plus handles on its mocks.
pub struct TestHarness {
    pub session: TestSession,
    pub browser: MockBrowserService,
    pub surface: MockAuthorizationSurface,
    pub store: InMemoryTokenStore,
}

impl TestHarness {
    pub async fn start() -> Self {
        Self::start_with_store(InMemoryTokenStore::new()).await
    }

    pub async fn start_with_store(store: InMemoryTokenStore) -> Self {
        let (connection, browser) = test_manager();
        let (auth, surface) = test_auth_client(store.clone());
        let mut session = Session::new(connection, auth, Router::new());
        session.start().await;
        Self {
            session,
            browser,
            surface,
            store,
        }
    }

    pub async fn send(&mut self, event: SessionEvent) {
        self.session
            .handle(event)
            .await
            .expect("event should be handled");
    }

    /// Answer the current connect cycle with handle `id`.
    pub async fn deliver_connection(&mut self, id: u64) {
        let cycle = self
            .session
            .connection()
            .current_cycle()
            .expect("a connect cycle should be running");
        self.send(SessionEvent::Browser(BrowserEvent::Connected {
            cycle,
            handle: ConnectionHandle::new(id, "root"),
        }))
        .await;
    }

    pub fn visible_handle_id(&self) -> Option<u64> {
        self.session
            .router()
            .visible()
            .and_then(|s| s.connection().map(ConnectionHandle::id))
    }

    pub fn visible_token_text(&self) -> Option<String> {
        self.session
            .router()
            .visible()
            .and_then(|s| s.token_display().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use musiclink::connection::ConnectionState;

    #[test]
    fn test_manager_starts_disconnected() {
        let (manager, browser) = test_manager();
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        assert!(browser.connect_calls().is_empty());
    }

    #[tokio::test]
    async fn test_harness_starts_on_browse_root() {
        let harness = TestHarness::start().await;
        let router = harness.session.router();
        assert_eq!(router.visible_key().map(|k| k.as_str()), Some("Browse:root"));
        assert_eq!(router.history_len(), 0);
    }
}
