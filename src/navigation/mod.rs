//! Navigation between surfaces.
//!
//! - [`NavDestination`] / [`IdentityKey`] - where to go and how it is deduplicated
//! - [`Surface`] / [`SurfaceFactory`] - what renders a destination
//! - [`Router`] - the surface registry, back history and side panel

mod destination;
mod router;
mod surface;

pub use destination::{IdentityKey, NavDestination, ROOT_NODE};
pub use router::{BackOutcome, Router, SurfaceId};
pub use surface::{
    BrowseSurface, DefaultSurfaceFactory, NowPlayingSurface, SettingsSurface, Surface,
    SurfaceFactory, UpNextSurface,
};
