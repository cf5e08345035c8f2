//! Terminal authorization surface for the reference client.
//!
//! Shows the start screen message and leaves the attempt pending; the
//! command loop answers it later through [`PendingPrompt`].

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use crate::auth::{AttemptId, AuthorizationRequest};
use crate::traits::{AuthorizationSurface, SurfaceError};

/// Shared view of the attempt waiting for an answer.
#[derive(Debug, Clone, Default)]
pub struct PendingPrompt {
    attempt: Arc<Mutex<Option<AttemptId>>>,
}

impl PendingPrompt {
    /// Take the pending attempt. Each attempt is answered at most once.
    pub fn take(&self) -> Option<AttemptId> {
        self.attempt
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn peek(&self) -> Option<AttemptId> {
        *self.attempt.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, attempt: AttemptId) {
        *self.attempt.lock().unwrap_or_else(PoisonError::into_inner) = Some(attempt);
    }
}

pub struct PromptAuthorizationSurface {
    out: Box<dyn Write + Send>,
    pending: PendingPrompt,
}

impl PromptAuthorizationSurface {
    /// Prompt on stdout.
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            pending: PendingPrompt::default(),
        }
    }

    pub fn pending(&self) -> PendingPrompt {
        self.pending.clone()
    }
}

impl Default for PromptAuthorizationSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorizationSurface for PromptAuthorizationSurface {
    fn launch(
        &mut self,
        request: &AuthorizationRequest,
        attempt: AttemptId,
    ) -> Result<(), SurfaceError> {
        if !request.hide_start_screen() {
            writeln!(self.out, "\n  {}", request.start_screen_message())
                .map_err(|e| SurfaceError::LaunchFailed(e.to_string()))?;
        }
        writeln!(
            self.out,
            "  Authorization requested ({}). Answer with `token <value>`, `deny <CODE>` or `dismiss`.",
            attempt
        )
        .and_then(|_| self.out.flush())
        .map_err(|e| SurfaceError::LaunchFailed(e.to_string()))?;

        info!(%attempt, context_id = request.context_id(), "Prompt shown");
        self.pending.set(attempt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RequestDefaults;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_launch_shows_message_and_sets_pending() {
        let buf = SharedBuf::default();
        let mut surface = PromptAuthorizationSurface::with_writer(Box::new(buf.clone()));
        let pending = surface.pending();
        let request = RequestDefaults::default().build_request("dev").unwrap();

        surface.launch(&request, AttemptId(2)).unwrap();

        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains(request.start_screen_message()));
        assert!(text.contains("attempt-2"));
        assert_eq!(pending.peek(), Some(AttemptId(2)));
        assert_eq!(pending.take(), Some(AttemptId(2)));
        assert_eq!(pending.take(), None);
    }

    #[test]
    fn test_hidden_start_screen() {
        let buf = SharedBuf::default();
        let mut surface = PromptAuthorizationSurface::with_writer(Box::new(buf.clone()));
        let defaults = RequestDefaults {
            hide_start_screen: true,
            ..RequestDefaults::default()
        };
        let request = defaults.build_request("dev").unwrap();

        surface.launch(&request, AttemptId(1)).unwrap();

        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(!text.contains(request.start_screen_message()));
    }
}
