//! Navigation destinations and their identity keys.

use std::fmt;

/// Sentinel browse node used when no parent id is given.
pub const ROOT_NODE: &str = "root";

/// Stable key used to deduplicate surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A place the user can navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavDestination {
    Browse {
        parent_id: Option<String>,
        title: Option<String>,
    },
    NowPlaying,
    UpNext,
    Settings,
}

impl NavDestination {
    /// Browse the root of the content tree.
    pub fn browse_root() -> Self {
        NavDestination::Browse {
            parent_id: None,
            title: None,
        }
    }

    pub fn browse(parent_id: impl Into<String>, title: Option<String>) -> Self {
        NavDestination::Browse {
            parent_id: Some(parent_id.into()),
            title,
        }
    }

    /// `Browse:<parent id>` (with [`ROOT_NODE`] for no parent); the other
    /// destinations are singletons keyed by name.
    pub fn identity_key(&self) -> IdentityKey {
        match self {
            NavDestination::Browse { parent_id, .. } => IdentityKey(format!(
                "Browse:{}",
                parent_id.as_deref().unwrap_or(ROOT_NODE)
            )),
            NavDestination::NowPlaying => IdentityKey("NowPlaying".to_string()),
            NavDestination::UpNext => IdentityKey("UpNext".to_string()),
            NavDestination::Settings => IdentityKey("Settings".to_string()),
        }
    }
}
