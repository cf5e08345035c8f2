//! Single-owner event loop tying the components together.
//!
//! Lifecycle events, browsing-service callbacks and authorization
//! deliveries all arrive as [`SessionEvent`]s on one channel and are
//! applied in order, so the components never see concurrent calls.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::auth::{AttemptId, AuthClient, AuthState, TokenResult};
use crate::connection::ConnectionManager;
use crate::error::{AuthError, ErrorContext, LinkError, LinkResult, ResultExt};
use crate::navigation::{BackOutcome, NavDestination, Router};
use crate::traits::{AuthorizationSurface, BrowserEvent, BrowserService, TokenStore};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The client became visible: connect.
    BecameVisible,
    /// The client was hidden: disconnect.
    BecameHidden,
    /// The user picked a destination.
    Navigate(NavDestination),
    /// Back gesture.
    Back,
    /// The user picked a destination from the side panel.
    SelectFromSidePanel(NavDestination),
    ToggleSidePanel,
    RequestAuthorization,
    CancelAuthorization,
    /// The authorization surface answered `attempt`.
    AuthorizationDelivered {
        attempt: AttemptId,
        payload: Option<String>,
    },
    SignOut,
    /// Callback from the browsing service.
    Browser(BrowserEvent),
    Shutdown,
}

pub struct Session<B, A, S> {
    connection: ConnectionManager<B>,
    auth: AuthClient<A, S>,
    router: Arc<Mutex<Router>>,
}

impl<B, A, S> Session<B, A, S>
where
    B: BrowserService,
    A: AuthorizationSurface,
    S: TokenStore,
{
    /// Wire the router up as a connection listener.
    pub fn new(mut connection: ConnectionManager<B>, auth: AuthClient<A, S>, router: Router) -> Self {
        let router = Arc::new(Mutex::new(router));
        connection.add_listener(Box::new(router.clone()));
        Self {
            connection,
            auth,
            router,
        }
    }

    /// Restore authorization state and show the root browse surface.
    pub async fn start(&mut self) -> &AuthState {
        self.auth.initialize().await;
        let live = self.connection.live_handle().cloned();
        self.router()
            .navigate(&NavDestination::browse_root(), false, live.as_ref());
        self.auth.auth_state()
    }

    pub fn connection(&self) -> &ConnectionManager<B> {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut ConnectionManager<B> {
        &mut self.connection
    }

    pub fn auth(&self) -> &AuthClient<A, S> {
        &self.auth
    }

    pub fn router(&self) -> MutexGuard<'_, Router> {
        self.router.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consume events until `Shutdown` or until every sender is gone, then
    /// disconnect.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<SessionEvent>) -> Self {
        info!("Session started");

        while let Some(event) = events.recv().await {
            debug!("Session event: {:?}", event);
            match self.handle(event).await {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => break,
                Err(e) if is_stale(&e) => debug!("{}", e),
                Err(e) => warn!(code = e.error_code(), "{}", e),
            }
        }

        self.connection.disconnect();
        info!("Session stopped");
        self
    }

    /// Apply one event.
    pub async fn handle(&mut self, event: SessionEvent) -> LinkResult<ControlFlow<()>> {
        match event {
            SessionEvent::BecameVisible => self.connection.connect(),
            SessionEvent::BecameHidden => self.connection.disconnect(),
            SessionEvent::Navigate(destination) => {
                let live = self.connection.live_handle().cloned();
                self.router().navigate(&destination, true, live.as_ref());
                if destination == NavDestination::Settings {
                    self.refresh_settings().await;
                }
            }
            SessionEvent::Back => {
                self.go_back().await;
            }
            SessionEvent::SelectFromSidePanel(destination) => {
                let live = self.connection.live_handle().cloned();
                self.router()
                    .select_from_side_panel(&destination, live.as_ref());
                if destination == NavDestination::Settings {
                    self.refresh_settings().await;
                }
            }
            SessionEvent::ToggleSidePanel => {
                self.router().toggle_side_panel();
            }
            SessionEvent::RequestAuthorization => {
                let launched = self.auth.authorize();
                if launched.is_err() {
                    self.show_auth_failure();
                }
                launched?;
            }
            SessionEvent::CancelAuthorization => {
                if self.auth.cancel().is_some() {
                    self.refresh_settings().await;
                }
            }
            SessionEvent::AuthorizationDelivered { attempt, payload } => {
                self.deliver(attempt, payload.as_deref())
                    .await
                    .with_context(|| {
                        ErrorContext::new("deliver_authorization")
                            .with_attempt(attempt.0)
                            .with_component("session")
                    })?;
            }
            SessionEvent::SignOut => {
                let signed_out = self.auth.sign_out().await;
                self.refresh_settings().await;
                signed_out?;
            }
            SessionEvent::Browser(event) => self.connection.handle_event(event),
            SessionEvent::Shutdown => return Ok(ControlFlow::Break(())),
        }

        Ok(ControlFlow::Continue(()))
    }

    /// Back navigation; a revealed surface gets the live handle.
    pub async fn go_back(&mut self) -> BackOutcome {
        let outcome = self.router().go_back();

        if let BackOutcome::Popped { now_visible, .. } = &outcome {
            if let Some(handle) = self.connection.live_handle().cloned() {
                self.router().forward_connection(&handle);
            }
            if now_visible.as_ref() == Some(&NavDestination::Settings.identity_key()) {
                self.refresh_settings().await;
            }
        }
        outcome
    }

    async fn deliver(
        &mut self,
        attempt: AttemptId,
        payload: Option<&str>,
    ) -> Result<TokenResult, AuthError> {
        match self.auth.handle_result(attempt, payload).await {
            Ok(result) if result.is_success() => {
                self.refresh_settings().await;
                Ok(result)
            }
            Ok(result) => {
                let text = result.display_text();
                self.router().show_token(Some(text.as_str()));
                Ok(result)
            }
            Err(e @ AuthError::StaleResult { .. }) => Err(e),
            Err(e) => {
                let text = e.user_message();
                self.router().show_token(Some(text.as_str()));
                Err(e)
            }
        }
    }

    /// Re-read the token store into the settings surface.
    async fn refresh_settings(&mut self) {
        let token = match self.auth.stored_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(code = e.error_code(), "{}", e);
                None
            }
        };
        self.router().show_token(token.as_deref());
    }

    fn show_auth_failure(&mut self) {
        if let AuthState::Failed(reason) = self.auth.auth_state() {
            let text = format!("Error getting token: {}", reason);
            self.router().show_token(Some(text.as_str()));
        }
    }

    /// One-line summary for the reference client.
    pub fn status(&self) -> String {
        let router = self.router();
        let visible = router
            .visible()
            .map(|s| s.describe())
            .unwrap_or_else(|| "(nothing visible)".to_string());
        let panel = if router.is_side_panel_open() {
            " [side panel open]"
        } else {
            ""
        };
        format!(
            "[{}] [{}] {}{}",
            self.connection.state(),
            self.auth.auth_state(),
            visible,
            panel
        )
    }
}

fn is_stale(err: &LinkError) -> bool {
    matches!(err.inner(), LinkError::Auth(AuthError::StaleResult { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{InMemoryTokenStore, MockAuthorizationSurface, MockBrowserService};
    use crate::connection::{ConnectionHandle, ConnectionState};
    use crate::navigation::{DefaultSurfaceFactory, Surface, SurfaceFactory};
    use crate::traits::ServiceDescriptor;

    type TestSession = Session<MockBrowserService, MockAuthorizationSurface, InMemoryTokenStore>;

    fn session(store: InMemoryTokenStore) -> TestSession {
        Session::new(
            ConnectionManager::new(MockBrowserService::new(), ServiceDescriptor::default()),
            AuthClient::new(MockAuthorizationSurface::new(), store, "dev-token"),
            Router::new(),
        )
    }

    /// Browse surface whose first connection panics while the router is
    /// locked.
    struct BrokenOnce {
        inner: Box<dyn Surface>,
        tripped: bool,
    }

    impl Surface for BrokenOnce {
        fn title(&self) -> String {
            self.inner.title()
        }

        fn on_connected(&mut self, handle: &ConnectionHandle) {
            if !self.tripped {
                self.tripped = true;
                panic!("surface bug");
            }
            self.inner.on_connected(handle);
        }

        fn on_disconnected(&mut self) {
            self.inner.on_disconnected();
        }

        fn connection(&self) -> Option<&ConnectionHandle> {
            self.inner.connection()
        }

        fn describe(&self) -> String {
            self.inner.describe()
        }
    }

    struct BrokenOnceFactory;

    impl SurfaceFactory for BrokenOnceFactory {
        fn create(&self, destination: &NavDestination) -> Box<dyn Surface> {
            Box::new(BrokenOnce {
                inner: DefaultSurfaceFactory.create(destination),
                tripped: false,
            })
        }
    }

    async fn connect_with(s: &mut TestSession, id: u64) {
        s.handle(SessionEvent::BecameVisible).await.unwrap();
        let cycle = s.connection().current_cycle().unwrap();
        s.handle(SessionEvent::Browser(BrowserEvent::Connected {
            cycle,
            handle: ConnectionHandle::new(id, "root"),
        }))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_visibility_drives_connection() {
        let mut s = session(InMemoryTokenStore::new());
        s.start().await;

        s.handle(SessionEvent::BecameVisible).await.unwrap();
        assert_eq!(s.connection().state(), ConnectionState::Connecting);

        s.handle(SessionEvent::BecameHidden).await.unwrap();
        assert_eq!(s.connection().state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connection_reaches_visible_surface() {
        let mut s = session(InMemoryTokenStore::new());
        s.start().await;
        s.handle(SessionEvent::BecameVisible).await.unwrap();
        let cycle = s.connection().current_cycle().unwrap();

        s.handle(SessionEvent::Browser(BrowserEvent::Connected {
            cycle,
            handle: ConnectionHandle::new(1, "root"),
        }))
        .await
        .unwrap();

        let router = s.router();
        assert_eq!(router.visible().unwrap().connection().map(|h| h.id()), Some(1));
    }

    #[tokio::test]
    async fn test_router_keeps_receiving_after_surface_panic() {
        let mut s = Session::new(
            ConnectionManager::new(MockBrowserService::new(), ServiceDescriptor::default()),
            AuthClient::new(
                MockAuthorizationSurface::new(),
                InMemoryTokenStore::new(),
                "dev-token",
            ),
            Router::with_factory(Box::new(BrokenOnceFactory)),
        );
        s.start().await;

        connect_with(&mut s, 1).await;
        assert_eq!(s.connection().state(), ConnectionState::Connected);
        assert!(s.router().visible().unwrap().connection().is_none());

        s.handle(SessionEvent::BecameHidden).await.unwrap();
        connect_with(&mut s, 2).await;

        assert_eq!(
            s.router().visible().unwrap().connection().map(|h| h.id()),
            Some(2)
        );
    }

    #[tokio::test]
    async fn test_leaving_connected_clears_surfaces() {
        let mut s = session(InMemoryTokenStore::new());
        s.start().await;
        connect_with(&mut s, 5).await;
        assert!(s.status().contains("handle#5"));

        s.handle(SessionEvent::BecameHidden).await.unwrap();

        assert!(s.router().visible().unwrap().connection().is_none());
        assert!(!s.status().contains("handle#5"));
    }

    #[tokio::test]
    async fn test_failed_delivery_renders_error_text() {
        let mut s = session(InMemoryTokenStore::new());
        s.start().await;
        s.handle(SessionEvent::Navigate(NavDestination::Settings))
            .await
            .unwrap();
        s.handle(SessionEvent::RequestAuthorization).await.unwrap();
        let attempt = s.auth().in_flight().unwrap();

        s.handle(SessionEvent::AuthorizationDelivered {
            attempt,
            payload: Some(r#"{"error":"NO_SUBSCRIPTION"}"#.to_string()),
        })
        .await
        .unwrap();

        let router = s.router();
        assert_eq!(
            router.visible().unwrap().token_display(),
            Some("Error getting token: NO_SUBSCRIPTION")
        );
    }

    #[tokio::test]
    async fn test_stale_delivery_is_an_error_without_side_effects() {
        let store = InMemoryTokenStore::new();
        let mut s = session(store.clone());
        s.start().await;

        let err = s
            .handle(SessionEvent::AuthorizationDelivered {
                attempt: AttemptId(42),
                payload: Some(r#"{"musicUserToken":"x"}"#.to_string()),
            })
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "E_AUTH_STALE");
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_sign_out_refreshes_settings() {
        let store = InMemoryTokenStore::with_token("abc");
        let mut s = session(store.clone());
        s.start().await;
        s.handle(SessionEvent::Navigate(NavDestination::Settings))
            .await
            .unwrap();
        assert_eq!(s.router().visible().unwrap().token_display(), Some("abc"));

        s.handle(SessionEvent::SignOut).await.unwrap();

        assert!(s.router().visible().unwrap().token_display().is_none());
        assert!(store.raw_token().is_none());
    }

    #[tokio::test]
    async fn test_back_reveals_surface_with_live_handle() {
        let mut s = session(InMemoryTokenStore::new());
        s.start().await;
        s.handle(SessionEvent::Navigate(NavDestination::NowPlaying))
            .await
            .unwrap();
        s.handle(SessionEvent::BecameVisible).await.unwrap();
        let cycle = s.connection().current_cycle().unwrap();
        s.handle(SessionEvent::Browser(BrowserEvent::Connected {
            cycle,
            handle: ConnectionHandle::new(3, "root"),
        }))
        .await
        .unwrap();

        let outcome = s.go_back().await;

        assert!(matches!(outcome, BackOutcome::Popped { .. }));
        let router = s.router();
        assert_eq!(router.visible().unwrap().connection().map(|h| h.id()), Some(3));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown_and_disconnects() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut s = session(InMemoryTokenStore::new());
        s.start().await;

        tx.send(SessionEvent::BecameVisible).unwrap();
        tx.send(SessionEvent::Shutdown).unwrap();
        tx.send(SessionEvent::BecameVisible).unwrap();

        let s = s.run(rx).await;

        assert_eq!(s.connection().state(), ConnectionState::Disconnected);
        assert_eq!(s.connection().browser().connect_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_status_line() {
        let mut s = session(InMemoryTokenStore::new());
        s.start().await;
        s.handle(SessionEvent::ToggleSidePanel).await.unwrap();

        let status = s.status();
        assert!(status.starts_with("[disconnected] [idle]"));
        assert!(status.contains("side panel open"));
    }
}
