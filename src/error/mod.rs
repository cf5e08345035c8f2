//! Unified error handling for musiclink.
//!
//! - **Error Categories**: High-level classification for handling decisions
//! - **Domain-specific Errors**: Connection, Auth, Config and System errors
//! - **Unified Error Type**: `LinkError` consolidates all error types
//! - **Error Context**: Attempt and cycle identifiers attached to errors
//! - **Result Type Alias**: `LinkResult<T>` for consistent return types
//!
//! # Error Categories
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Connection | Connect failed or suspended | Manually |
//! | Auth | Authorization surface reported an error | No |
//! | Client | Stale deliveries, listener bugs | No |
//! | User | Consent dismissed | Yes |
//! | System | OS/filesystem errors | Sometimes |
//! | Configuration | Missing developer token, bad config | No |

mod auth;
mod category;
mod config;
mod connection;
mod context;
mod link_error;
mod result;
mod system;

pub use auth::AuthError;
pub use category::ErrorCategory;
pub use config::ConfigError;
pub use connection::ConnectionError;
pub use context::ErrorContext;
pub use link_error::LinkError;
pub use result::{LinkResult, ResultExt};
pub use system::{classify_io_error, SystemError};
