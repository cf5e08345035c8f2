//! musiclink - connection, authorization and navigation core of a music
//! streaming client.
//!
//! This library exposes modules for use in integration tests and by the
//! reference client in `main.rs`.

pub mod adapters;
pub mod auth;
pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod session;
pub mod traits;
