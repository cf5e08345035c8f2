//! Classification of raw authorization results.
//!
//! The surface delivers a JSON object. `{"musicUserToken": "..."}` is a
//! success; `{"error": "CODE", "errorDescription": "..."}` is a failure.
//! Anything else, including no payload at all, is a malformed result.

use serde::Deserialize;
use std::fmt;

/// Error code the surface reports when the user dismisses consent.
pub const USER_CANCELLED_CODE: &str = "USER_CANCELLED";

/// Why an authorization attempt did not produce a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenErrorKind {
    MalformedResult,
    AuthorizationDenied,
    UserCancelled,
}

impl TokenErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenErrorKind::MalformedResult => "malformed-result",
            TokenErrorKind::AuthorizationDenied => "authorization-denied",
            TokenErrorKind::UserCancelled => "user-cancelled",
        }
    }
}

impl fmt::Display for TokenErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenResult {
    Success {
        music_user_token: String,
    },
    Failure {
        kind: TokenErrorKind,
        detail: String,
    },
}

impl TokenResult {
    pub fn success(token: impl Into<String>) -> Self {
        TokenResult::Success {
            music_user_token: token.into(),
        }
    }

    pub fn failure(kind: TokenErrorKind, detail: impl Into<String>) -> Self {
        TokenResult::Failure {
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TokenResult::Success { .. })
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            TokenResult::Success { music_user_token } => Some(music_user_token),
            TokenResult::Failure { .. } => None,
        }
    }

    /// Text a settings view renders in place of the token.
    pub fn display_text(&self) -> String {
        match self {
            TokenResult::Success { music_user_token } => music_user_token.clone(),
            TokenResult::Failure { detail, .. } => format!("Error getting token: {}", detail),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResult {
    music_user_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Classify a raw payload. Never fails: bad input is a `MalformedResult`.
///
/// An `error` field wins over a token if both are present.
pub fn classify(raw: Option<&str>) -> TokenResult {
    let Some(raw) = raw else {
        return TokenResult::failure(TokenErrorKind::MalformedResult, "no result delivered");
    };

    let parsed: RawResult = match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            return TokenResult::failure(
                TokenErrorKind::MalformedResult,
                format!("unparseable result: {}", e),
            )
        }
    };

    if let Some(code) = parsed.error.filter(|c| !c.is_empty()) {
        let kind = if code == USER_CANCELLED_CODE {
            TokenErrorKind::UserCancelled
        } else {
            TokenErrorKind::AuthorizationDenied
        };
        let detail = match parsed.error_description.filter(|d| !d.is_empty()) {
            Some(description) => format!("{}: {}", code, description),
            None => code,
        };
        return TokenResult::failure(kind, detail);
    }

    match parsed.music_user_token.filter(|t| !t.is_empty()) {
        Some(token) => TokenResult::success(token),
        None => TokenResult::failure(
            TokenErrorKind::MalformedResult,
            "result carries neither a token nor an error",
        ),
    }
}
