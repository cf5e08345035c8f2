//! Mock authorization surface for testing.

use std::sync::{Arc, Mutex};

use crate::auth::{AttemptId, AuthorizationRequest};
use crate::traits::{AuthorizationSurface, SurfaceError};

/// Records launches; tests deliver results through the client directly.
#[derive(Debug, Clone, Default)]
pub struct MockAuthorizationSurface {
    launches: Arc<Mutex<Vec<(AttemptId, AuthorizationRequest)>>>,
    launch_should_fail: Arc<Mutex<bool>>,
}

impl MockAuthorizationSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_launch_should_fail(&self, should_fail: bool) {
        *self.launch_should_fail.lock().unwrap() = should_fail;
    }

    /// Attempts launched so far, in order.
    pub fn launched(&self) -> Vec<AttemptId> {
        self.launches
            .lock()
            .unwrap()
            .iter()
            .map(|(attempt, _)| *attempt)
            .collect()
    }

    pub fn last_request(&self) -> Option<AuthorizationRequest> {
        self.launches
            .lock()
            .unwrap()
            .last()
            .map(|(_, request)| request.clone())
    }
}

impl AuthorizationSurface for MockAuthorizationSurface {
    fn launch(
        &mut self,
        request: &AuthorizationRequest,
        attempt: AttemptId,
    ) -> Result<(), SurfaceError> {
        if *self.launch_should_fail.lock().unwrap() {
            return Err(SurfaceError::LaunchFailed("Mock launch failure".to_string()));
        }
        self.launches
            .lock()
            .unwrap()
            .push((attempt, request.clone()));
        Ok(())
    }
}
