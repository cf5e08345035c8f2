//! Authorization surface trait abstraction.

use crate::auth::{AttemptId, AuthorizationRequest};

/// Authorization surface errors.
#[derive(Debug, Clone)]
pub enum SurfaceError {
    /// The surface could not be shown.
    LaunchFailed(String),
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::LaunchFailed(msg) => write!(f, "Failed to launch surface: {}", msg),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Trait for the external consent flow.
///
/// `launch` returns as soon as the surface is shown. The surface later
/// delivers exactly one raw payload correlated by `attempt`, or nothing at
/// all if it is torn down.
pub trait AuthorizationSurface: Send {
    fn launch(
        &mut self,
        request: &AuthorizationRequest,
        attempt: AttemptId,
    ) -> Result<(), SurfaceError>;
}
