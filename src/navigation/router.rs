//! Navigation router.
//!
//! Surfaces live in a registry keyed by [`IdentityKey`]; navigating to a
//! destination whose key is already registered reuses that surface. The
//! router keeps a back history of transitions and the open/closed state of
//! the side panel.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use super::destination::{IdentityKey, NavDestination};
use super::surface::{DefaultSurfaceFactory, Surface, SurfaceFactory};
use crate::connection::{ConnectionHandle, ConnectionListener, ListenerError};

/// Identifier of one constructed surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// What `go_back` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackOutcome {
    /// A recorded transition was undone.
    Popped {
        left: IdentityKey,
        now_visible: Option<IdentityKey>,
    },
    /// No history; the side panel was open and is now closed.
    ClosedSidePanel,
    /// Nothing to undo; the platform's default back behaviour applies.
    Default,
}

#[derive(Debug, Clone)]
struct Transition {
    from: Option<IdentityKey>,
    to: IdentityKey,
}

struct Entry {
    id: SurfaceId,
    surface: Box<dyn Surface>,
}

pub struct Router {
    factory: Box<dyn SurfaceFactory>,
    surfaces: HashMap<IdentityKey, Entry>,
    visible: Option<IdentityKey>,
    history: Vec<Transition>,
    side_panel_open: bool,
    next_id: u64,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::with_factory(Box::new(DefaultSurfaceFactory))
    }

    pub fn with_factory(factory: Box<dyn SurfaceFactory>) -> Self {
        Self {
            factory,
            surfaces: HashMap::new(),
            visible: None,
            history: Vec::new(),
            side_panel_open: false,
            next_id: 1,
        }
    }

    /// Show `destination`, reusing its surface if one exists.
    ///
    /// A live handle is delivered to the surface before it becomes visible.
    /// With `push_history` the transition is recorded for `go_back`; a
    /// navigation to the surface already visible records nothing.
    pub fn navigate(
        &mut self,
        destination: &NavDestination,
        push_history: bool,
        live: Option<&ConnectionHandle>,
    ) -> SurfaceId {
        let key = destination.identity_key();

        let factory = &self.factory;
        let next_id = &mut self.next_id;
        let entry = self.surfaces.entry(key.clone()).or_insert_with(|| {
            let id = SurfaceId(*next_id);
            *next_id += 1;
            debug!("Created {} for {}", id, key);
            Entry {
                id,
                surface: factory.create(destination),
            }
        });

        if let Some(handle) = live {
            entry.surface.on_connected(handle);
        }
        let id = entry.id;

        if self.visible.as_ref() != Some(&key) {
            let previous = self.visible.replace(key.clone());
            if push_history {
                self.history.push(Transition {
                    from: previous,
                    to: key.clone(),
                });
            }
        }

        debug!("Showing {} ({})", key, id);
        id
    }

    /// Navigate from the side panel: recorded in history, panel closed.
    pub fn select_from_side_panel(
        &mut self,
        destination: &NavDestination,
        live: Option<&ConnectionHandle>,
    ) -> SurfaceId {
        let id = self.navigate(destination, true, live);
        self.close_side_panel();
        id
    }

    /// Undo the most recent transition, else close the side panel.
    pub fn go_back(&mut self) -> BackOutcome {
        if let Some(transition) = self.history.pop() {
            self.visible = transition.from.clone();
            debug!("Back from {} to {:?}", transition.to, transition.from);
            return BackOutcome::Popped {
                left: transition.to,
                now_visible: transition.from,
            };
        }

        if self.side_panel_open {
            self.side_panel_open = false;
            return BackOutcome::ClosedSidePanel;
        }

        BackOutcome::Default
    }

    /// Deliver `handle` to the visible surface only.
    pub fn forward_connection(&mut self, handle: &ConnectionHandle) -> Option<SurfaceId> {
        let key = self.visible.as_ref()?;
        let entry = self.surfaces.get_mut(key)?;
        entry.surface.on_connected(handle);
        debug!("Forwarded {} to {}", handle, entry.id);
        Some(entry.id)
    }

    /// Drop the connection from every surface, visible or not.
    pub fn clear_connection(&mut self) {
        for entry in self.surfaces.values_mut() {
            entry.surface.on_disconnected();
        }
        debug!("Cleared connection from {} surface(s)", self.surfaces.len());
    }

    /// Push token text to the settings surface, if it exists.
    pub fn show_token(&mut self, text: Option<&str>) -> bool {
        let key = NavDestination::Settings.identity_key();
        match self.surfaces.get_mut(&key) {
            Some(entry) => {
                entry.surface.on_token_display(text);
                true
            }
            None => false,
        }
    }

    pub fn open_side_panel(&mut self) {
        self.side_panel_open = true;
    }

    pub fn close_side_panel(&mut self) {
        self.side_panel_open = false;
    }

    pub fn toggle_side_panel(&mut self) -> bool {
        self.side_panel_open = !self.side_panel_open;
        self.side_panel_open
    }

    pub fn is_side_panel_open(&self) -> bool {
        self.side_panel_open
    }

    pub fn visible_key(&self) -> Option<&IdentityKey> {
        self.visible.as_ref()
    }

    pub fn visible(&self) -> Option<&dyn Surface> {
        let key = self.visible.as_ref()?;
        self.surfaces.get(key).map(|e| e.surface.as_ref())
    }

    pub fn visible_id(&self) -> Option<SurfaceId> {
        let key = self.visible.as_ref()?;
        self.surfaces.get(key).map(|e| e.id)
    }

    pub fn surface(&self, key: &IdentityKey) -> Option<&dyn Surface> {
        self.surfaces.get(key).map(|e| e.surface.as_ref())
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl ConnectionListener for Router {
    fn on_connected(&mut self, handle: &ConnectionHandle) -> Result<(), ListenerError> {
        self.forward_connection(handle);
        Ok(())
    }

    fn on_disconnected(&mut self) -> Result<(), ListenerError> {
        self.clear_connection();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: u64) -> ConnectionHandle {
        ConnectionHandle::new(id, "root")
    }

    #[test]
    fn test_same_browse_node_reuses_surface() {
        let mut router = Router::new();
        let dest = NavDestination::browse("root", None);

        let first = router.navigate(&dest, true, None);
        let second = router.navigate(&dest, true, None);

        assert_eq!(first, second);
        assert_eq!(router.surface_count(), 1);
        assert_eq!(router.history_len(), 1);
    }

    #[test]
    fn test_distinct_nodes_get_distinct_surfaces() {
        let mut router = Router::new();
        let a = router.navigate(&NavDestination::browse("a", None), true, None);
        let b = router.navigate(&NavDestination::browse("b", None), true, None);
        let a_again = router.navigate(&NavDestination::browse("a", None), true, None);

        assert_ne!(a, b);
        assert_eq!(a, a_again);
        assert_eq!(router.surface_count(), 2);
    }

    #[test]
    fn test_live_handle_delivered_before_visible() {
        let mut router = Router::new();
        let h = handle(5);

        router.navigate(&NavDestination::NowPlaying, true, Some(&h));

        let visible = router.visible().unwrap();
        assert_eq!(visible.connection().map(|c| c.id()), Some(5));
    }

    #[test]
    fn test_forward_connection_reaches_visible_only() {
        let mut router = Router::new();
        router.navigate(&NavDestination::UpNext, false, None);
        router.navigate(&NavDestination::NowPlaying, true, None);

        router.forward_connection(&handle(2));

        let up_next = router
            .surface(&NavDestination::UpNext.identity_key())
            .unwrap();
        assert!(up_next.connection().is_none());
        assert_eq!(router.visible().unwrap().connection().map(|c| c.id()), Some(2));
    }

    #[test]
    fn test_back_pops_history_then_closes_panel() {
        let mut router = Router::new();
        router.navigate(&NavDestination::browse_root(), false, None);
        router.navigate(&NavDestination::Settings, true, None);
        router.open_side_panel();

        assert_eq!(
            router.go_back(),
            BackOutcome::Popped {
                left: NavDestination::Settings.identity_key(),
                now_visible: Some(NavDestination::browse_root().identity_key()),
            }
        );
        assert!(router.is_side_panel_open());
        assert_eq!(router.go_back(), BackOutcome::ClosedSidePanel);
        assert_eq!(router.go_back(), BackOutcome::Default);
    }

    #[test]
    fn test_select_from_side_panel_closes_panel() {
        let mut router = Router::new();
        router.open_side_panel();

        router.select_from_side_panel(&NavDestination::UpNext, None);

        assert!(!router.is_side_panel_open());
        assert_eq!(router.history_len(), 1);
        assert_eq!(
            router.visible_key(),
            Some(&NavDestination::UpNext.identity_key())
        );
    }

    #[test]
    fn test_show_token_needs_settings_surface() {
        let mut router = Router::new();
        assert!(!router.show_token(Some("abc")));

        router.navigate(&NavDestination::Settings, true, None);
        assert!(router.show_token(Some("abc")));
        assert_eq!(router.visible().unwrap().token_display(), Some("abc"));
    }

    #[test]
    fn test_router_as_listener() {
        let mut router = Router::new();
        router.navigate(&NavDestination::browse_root(), false, None);

        ConnectionListener::on_connected(&mut router, &handle(8)).unwrap();

        assert_eq!(router.visible().unwrap().connection().map(|c| c.id()), Some(8));

        ConnectionListener::on_disconnected(&mut router).unwrap();

        assert!(router.visible().unwrap().connection().is_none());
    }

    #[test]
    fn test_clear_connection_reaches_hidden_surfaces() {
        let mut router = Router::new();
        router.navigate(&NavDestination::UpNext, false, Some(&handle(1)));
        router.navigate(&NavDestination::NowPlaying, true, Some(&handle(1)));

        router.clear_connection();

        let up_next = router
            .surface(&NavDestination::UpNext.identity_key())
            .unwrap();
        assert!(up_next.connection().is_none());
        assert!(router.visible().unwrap().connection().is_none());
        assert_eq!(router.go_back(), BackOutcome::Popped {
            left: NavDestination::NowPlaying.identity_key(),
            now_visible: Some(NavDestination::UpNext.identity_key()),
        });
        assert!(router.visible().unwrap().connection().is_none());
    }
}
