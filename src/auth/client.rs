//! Authorization client.
//!
//! Builds a request, hands it to the authorization surface and classifies
//! whatever comes back. At most one attempt is in flight: launching again
//! supersedes the previous attempt, and a delivery for anything other than
//! the in-flight attempt is dropped without touching the token store.

use std::fmt;

use tracing::{debug, info, warn};

use super::request::{AuthorizationRequest, RequestDefaults};
use super::result::{classify, TokenErrorKind, TokenResult};
use crate::error::{AuthError, ConfigError};
use crate::traits::{AuthorizationSurface, TokenStore};

/// Identifier correlating a launch with its delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(pub u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt-{}", self.0)
    }
}

/// Authorization status as seen by the rest of the client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Idle,
    Authorizing,
    Authorized,
    Cancelled,
    Failed(String),
}

impl AuthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthState::Idle => "idle",
            AuthState::Authorizing => "authorizing",
            AuthState::Authorized => "authorized",
            AuthState::Cancelled => "cancelled",
            AuthState::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::Failed(reason) => write!(f, "failed ({})", reason),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Drives authorization attempts against a surface and a token store.
pub struct AuthClient<A, S> {
    surface: A,
    store: S,
    developer_token: String,
    defaults: RequestDefaults,
    state: AuthState,
    in_flight: Option<AttemptId>,
    next_attempt: u64,
}

impl<A: AuthorizationSurface, S: TokenStore> AuthClient<A, S> {
    pub fn new(surface: A, store: S, developer_token: impl Into<String>) -> Self {
        Self {
            surface,
            store,
            developer_token: developer_token.into(),
            defaults: RequestDefaults::default(),
            state: AuthState::Idle,
            in_flight: None,
            next_attempt: 1,
        }
    }

    pub fn with_defaults(mut self, defaults: RequestDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn auth_state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authorized(&self) -> bool {
        self.state == AuthState::Authorized
    }

    pub fn in_flight(&self) -> Option<AttemptId> {
        self.in_flight
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn surface(&self) -> &A {
        &self.surface
    }

    /// Restore state at startup.
    ///
    /// A missing developer token is a configuration failure; otherwise a
    /// stored token means `Authorized`.
    pub async fn initialize(&mut self) -> &AuthState {
        if self.developer_token.trim().is_empty() {
            let err = ConfigError::MissingDeveloperToken;
            warn!(code = err.error_code(), "{}", err);
            self.state = AuthState::Failed(err.to_string());
            return &self.state;
        }

        self.state = match self.store.get().await {
            Ok(Some(_)) => AuthState::Authorized,
            Ok(None) => AuthState::Idle,
            Err(e) => {
                warn!("Could not read stored token: {}", e);
                AuthState::Idle
            }
        };
        info!("Authorization initialized: {}", self.state);
        &self.state
    }

    /// Build a request from the configured developer token and defaults.
    pub fn build_request(&self) -> Result<AuthorizationRequest, ConfigError> {
        self.defaults.build_request(&self.developer_token)
    }

    /// Hand `request` to the surface.
    ///
    /// Any attempt already in flight is superseded; its delivery will be
    /// rejected as stale.
    pub fn launch(&mut self, request: &AuthorizationRequest) -> Result<AttemptId, AuthError> {
        let attempt = AttemptId(self.next_attempt);
        self.next_attempt += 1;

        if let Some(previous) = self.in_flight.replace(attempt) {
            info!("{} supersedes {}", attempt, previous);
        }

        if let Err(e) = self.surface.launch(request, attempt) {
            self.in_flight = None;
            let err = AuthError::LaunchFailed {
                message: e.to_string(),
            };
            warn!(code = err.error_code(), %attempt, "{}", err);
            self.state = AuthState::Failed(err.to_string());
            return Err(err);
        }

        info!(%attempt, "Authorization launched");
        self.state = AuthState::Authorizing;
        Ok(attempt)
    }

    /// Build and launch in one step.
    ///
    /// A missing developer token fails the attempt before the surface is
    /// involved.
    pub fn authorize(&mut self) -> Result<AttemptId, crate::error::LinkError> {
        let request = match self.build_request() {
            Ok(request) => request,
            Err(err) => {
                warn!(code = err.error_code(), "{}", err);
                self.state = AuthState::Failed(err.to_string());
                return Err(err.into());
            }
        };
        Ok(self.launch(&request)?)
    }

    /// Abandon the in-flight attempt. Its delivery will be dropped.
    pub fn cancel(&mut self) -> Option<AttemptId> {
        let attempt = self.in_flight.take()?;
        info!(%attempt, "Authorization cancelled");
        self.state = AuthState::Cancelled;
        Some(attempt)
    }

    /// Classify the delivery for `attempt` and persist a token on success.
    ///
    /// Returns [`AuthError::StaleResult`] for a superseded, cancelled or
    /// unknown attempt, and [`AuthError::TokenSaveFailed`] if the token
    /// could not be stored. Malformed and denied results are not errors:
    /// they come back as a `Failure`.
    pub async fn handle_result(
        &mut self,
        attempt: AttemptId,
        raw: Option<&str>,
    ) -> Result<TokenResult, AuthError> {
        if self.in_flight != Some(attempt) {
            debug!(%attempt, in_flight = ?self.in_flight, "Dropping stale authorization result");
            return Err(AuthError::StaleResult { attempt: attempt.0 });
        }
        self.in_flight = None;

        let result = classify(raw);
        match &result {
            TokenResult::Success { music_user_token } => {
                if let Err(e) = self.store.set(music_user_token).await {
                    let err = AuthError::TokenSaveFailed {
                        message: e.to_string(),
                    };
                    warn!(code = err.error_code(), %attempt, "{}", err);
                    self.state = AuthState::Failed(err.to_string());
                    return Err(err);
                }
                info!(%attempt, "Music user token stored");
                self.state = AuthState::Authorized;
            }
            TokenResult::Failure {
                kind: TokenErrorKind::UserCancelled,
                ..
            } => {
                info!(%attempt, "User cancelled authorization");
                self.state = AuthState::Cancelled;
            }
            TokenResult::Failure { kind, detail } => {
                warn!(%attempt, %kind, "Authorization failed: {}", detail);
                self.state = AuthState::Failed(detail.clone());
            }
        }

        Ok(result)
    }

    /// Current stored token, for rendering.
    pub async fn stored_token(&self) -> Result<Option<String>, AuthError> {
        self.store
            .get()
            .await
            .map_err(|e| AuthError::TokenStoreUnavailable {
                message: e.to_string(),
            })
    }

    /// Forget the stored token and any attempt in flight.
    pub async fn sign_out(&mut self) -> Result<(), AuthError> {
        self.in_flight = None;
        self.store
            .clear()
            .await
            .map_err(|e| AuthError::TokenStoreUnavailable {
                message: e.to_string(),
            })?;
        info!("Signed out");
        self.state = AuthState::Idle;
        Ok(())
    }
}
