//! Mock implementations for test fixtures.
//!
//! Re-exports the mocks from `musiclink::adapters::mock` and adds payload
//! builders for the authorization surface.

pub use musiclink::adapters::mock::{
    InMemoryTokenStore, MockAuthorizationSurface, MockBrowserService, RecordingListener,
};

use serde_json::json;

/// Payload of a successful authorization.
pub fn token_payload(token: &str) -> String {
    json!({ "musicUserToken": token }).to_string()
}

/// Payload of a failed authorization.
pub fn error_payload(code: &str) -> String {
    json!({ "error": code }).to_string()
}

#[allow(dead_code)]
pub fn error_payload_with_description(code: &str, description: &str) -> String {
    json!({ "error": code, "errorDescription": description }).to_string()
}
