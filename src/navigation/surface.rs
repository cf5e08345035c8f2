//! Navigable surfaces.
//!
//! A surface is whatever renders one destination. The router only needs to
//! hand it the live connection and, for settings, the token text.

use crate::connection::ConnectionHandle;

use super::destination::{NavDestination, ROOT_NODE};

pub trait Surface: Send {
    fn title(&self) -> String;

    /// A live connection became available while this surface is in use.
    fn on_connected(&mut self, handle: &ConnectionHandle);

    /// The connection passed to `on_connected` was released.
    fn on_disconnected(&mut self) {}

    /// Token text to render, `None` when not authorized. Only the settings
    /// surface cares.
    fn on_token_display(&mut self, _text: Option<&str>) {}

    fn connection(&self) -> Option<&ConnectionHandle> {
        None
    }

    fn token_display(&self) -> Option<&str> {
        None
    }

    /// One-line description for the reference client.
    fn describe(&self) -> String;
}

/// Builds the surface for a destination.
pub trait SurfaceFactory: Send {
    fn create(&self, destination: &NavDestination) -> Box<dyn Surface>;
}

fn connection_note(handle: Option<&ConnectionHandle>) -> String {
    match handle {
        Some(handle) => format!("via {}", handle),
        None => "waiting for connection".to_string(),
    }
}

/// Lists the children of one node of the content tree.
#[derive(Debug, Clone)]
pub struct BrowseSurface {
    parent_id: Option<String>,
    title: String,
    handle: Option<ConnectionHandle>,
}

impl BrowseSurface {
    pub fn new(parent_id: Option<String>, title: Option<String>) -> Self {
        Self {
            parent_id,
            title: title.unwrap_or_else(|| "Library".to_string()),
            handle: None,
        }
    }

    /// Node being listed. Without an explicit parent this is the service's
    /// root once connected.
    pub fn node_id(&self) -> &str {
        match (&self.parent_id, &self.handle) {
            (Some(parent), _) => parent,
            (None, Some(handle)) => handle.root_id(),
            (None, None) => ROOT_NODE,
        }
    }
}

impl Surface for BrowseSurface {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn on_connected(&mut self, handle: &ConnectionHandle) {
        self.handle = Some(handle.clone());
    }

    fn on_disconnected(&mut self) {
        self.handle = None;
    }

    fn connection(&self) -> Option<&ConnectionHandle> {
        self.handle.as_ref()
    }

    fn describe(&self) -> String {
        format!(
            "{}: browsing '{}' ({})",
            self.title,
            self.node_id(),
            connection_note(self.handle.as_ref())
        )
    }
}

/// Current playback.
#[derive(Debug, Clone, Default)]
pub struct NowPlayingSurface {
    handle: Option<ConnectionHandle>,
}

impl Surface for NowPlayingSurface {
    fn title(&self) -> String {
        "Now Playing".to_string()
    }

    fn on_connected(&mut self, handle: &ConnectionHandle) {
        self.handle = Some(handle.clone());
    }

    fn on_disconnected(&mut self) {
        self.handle = None;
    }

    fn connection(&self) -> Option<&ConnectionHandle> {
        self.handle.as_ref()
    }

    fn describe(&self) -> String {
        format!("Now Playing ({})", connection_note(self.handle.as_ref()))
    }
}

/// The playback queue.
#[derive(Debug, Clone, Default)]
pub struct UpNextSurface {
    handle: Option<ConnectionHandle>,
}

impl Surface for UpNextSurface {
    fn title(&self) -> String {
        "Up Next".to_string()
    }

    fn on_connected(&mut self, handle: &ConnectionHandle) {
        self.handle = Some(handle.clone());
    }

    fn on_disconnected(&mut self) {
        self.handle = None;
    }

    fn connection(&self) -> Option<&ConnectionHandle> {
        self.handle.as_ref()
    }

    fn describe(&self) -> String {
        format!("Up Next ({})", connection_note(self.handle.as_ref()))
    }
}

/// Shows the stored music user token, or why there is none.
#[derive(Debug, Clone, Default)]
pub struct SettingsSurface {
    token_text: Option<String>,
}

impl Surface for SettingsSurface {
    fn title(&self) -> String {
        "Settings".to_string()
    }

    fn on_connected(&mut self, _handle: &ConnectionHandle) {}

    fn on_token_display(&mut self, text: Option<&str>) {
        self.token_text = text.map(str::to_string);
    }

    fn token_display(&self) -> Option<&str> {
        self.token_text.as_deref()
    }

    fn describe(&self) -> String {
        match &self.token_text {
            Some(text) => format!("Settings: music user token: {}", text),
            None => "Settings: not authorized".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSurfaceFactory;

impl SurfaceFactory for DefaultSurfaceFactory {
    fn create(&self, destination: &NavDestination) -> Box<dyn Surface> {
        match destination {
            NavDestination::Browse { parent_id, title } => {
                Box::new(BrowseSurface::new(parent_id.clone(), title.clone()))
            }
            NavDestination::NowPlaying => Box::new(NowPlayingSurface::default()),
            NavDestination::UpNext => Box::new(UpNextSurface::default()),
            NavDestination::Settings => Box::new(SettingsSurface::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browse_root_resolves_from_handle() {
        let mut surface = BrowseSurface::new(None, None);
        assert_eq!(surface.node_id(), ROOT_NODE);

        surface.on_connected(&ConnectionHandle::new(1, "library-root"));

        assert_eq!(surface.node_id(), "library-root");
        assert!(surface.describe().contains("handle#1"));
    }

    #[test]
    fn test_disconnect_drops_released_handle() {
        let mut surface = BrowseSurface::new(None, None);
        surface.on_connected(&ConnectionHandle::new(3, "library-root"));

        surface.on_disconnected();

        assert!(surface.connection().is_none());
        assert_eq!(surface.node_id(), ROOT_NODE);
        assert!(surface.describe().contains("waiting for connection"));
    }

    #[test]
    fn test_browse_explicit_parent_wins() {
        let mut surface = BrowseSurface::new(Some("album-9".to_string()), Some("Albums".to_string()));
        surface.on_connected(&ConnectionHandle::new(1, "library-root"));

        assert_eq!(surface.node_id(), "album-9");
        assert_eq!(surface.title(), "Albums");
    }

    #[test]
    fn test_settings_renders_token_text() {
        let mut surface = SettingsSurface::default();
        assert!(surface.describe().contains("not authorized"));

        surface.on_token_display(Some("abc123"));

        assert_eq!(surface.token_display(), Some("abc123"));
        assert!(surface.describe().contains("abc123"));

        surface.on_token_display(None);
        assert!(surface.token_display().is_none());
    }

    #[test]
    fn test_factory_matches_destination() {
        let factory = DefaultSurfaceFactory;
        assert_eq!(factory.create(&NavDestination::UpNext).title(), "Up Next");
        assert_eq!(factory.create(&NavDestination::NowPlaying).title(), "Now Playing");
        assert_eq!(factory.create(&NavDestination::Settings).title(), "Settings");
        assert_eq!(factory.create(&NavDestination::browse_root()).title(), "Library");
    }
}
