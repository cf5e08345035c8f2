//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockBrowserService`] - Records connects and released handles
//! - [`MockAuthorizationSurface`] - Records launched attempts
//! - [`InMemoryTokenStore`] - In-memory token slot with failure injection
//! - [`RecordingListener`] - Logs connection deliveries

pub mod auth_surface;
pub mod browser;
pub mod listener;
pub mod token_store;

pub use auth_surface::MockAuthorizationSurface;
pub use browser::MockBrowserService;
pub use listener::RecordingListener;
pub use token_store::InMemoryTokenStore;
