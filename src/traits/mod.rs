//! Trait abstractions for the external collaborators.
//!
//! # Traits
//!
//! - [`BrowserService`] - Connection to the media-browsing service
//! - [`AuthorizationSurface`] - External consent flow producing a music user token
//! - [`TokenStore`] - Durable storage of the music user token

pub mod auth_surface;
pub mod browser;
pub mod token_store;

pub use auth_surface::{AuthorizationSurface, SurfaceError};
pub use browser::{BrowserError, BrowserEvent, BrowserService, ServiceDescriptor};
pub use token_store::{TokenStore, TokenStoreError};
