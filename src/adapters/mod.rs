//! Concrete implementations of the trait abstractions.
//!
//! # Adapters
//!
//! - [`FileTokenStore`] - Token stored as JSON in the data directory
//! - [`LoopbackBrowserService`] - In-process browsing service for the reference client
//! - [`PromptAuthorizationSurface`] - Terminal prompt standing in for the consent flow
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockBrowserService`]
//! - [`mock::MockAuthorizationSurface`]
//! - [`mock::InMemoryTokenStore`]
//! - [`mock::RecordingListener`]

pub mod file_token_store;
pub mod loopback;
pub mod mock;
pub mod prompt_surface;

pub use file_token_store::FileTokenStore;
pub use loopback::LoopbackBrowserService;
pub use mock::{InMemoryTokenStore, MockAuthorizationSurface, MockBrowserService};
pub use prompt_surface::{PendingPrompt, PromptAuthorizationSurface};
