//! Authorization against the music service.
//!
//! - [`request`] - building the request handed to the authorization surface
//! - [`result`] - classifying the raw result into a [`TokenResult`]
//! - [`client`] - the single-flight [`AuthClient`] state machine
//! - [`token`] - on-disk storage of the music user token

pub mod client;
pub mod request;
pub mod result;
pub mod token;

pub use client::{AttemptId, AuthClient, AuthState};
pub use request::{AuthorizationRequest, RequestDefaults};
pub use result::{classify, TokenErrorKind, TokenResult, USER_CANCELLED_CODE};
pub use token::{StoredToken, TokenFile, TokenFileError};
