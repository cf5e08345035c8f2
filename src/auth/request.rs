//! Authorization request construction.

use serde::Serialize;
use std::collections::HashMap;

use crate::error::ConfigError;

/// Custom parameter key for the campaign token.
pub const CAMPAIGN_TOKEN_PARAM: &str = "ct";
/// Custom parameter key for the affiliate token.
pub const AFFILIATE_TOKEN_PARAM: &str = "at";

pub const DEFAULT_CAMPAIGN_TOKEN: &str = "mytestCampaignToken";
pub const DEFAULT_AFFILIATE_TOKEN: &str = "mytestAffiliateToken";
pub const DEFAULT_CONTEXT_ID: &str = "1100742453";
pub const DEFAULT_START_SCREEN_MESSAGE: &str =
    "To play the full song, connect musiclink to your music subscription.";

/// What the authorization surface is asked to do.
///
/// Immutable once built; a fresh request is built for every attempt.
/// Serializes with the field names the surface expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRequest {
    developer_token: String,
    hide_start_screen: bool,
    start_screen_message: String,
    custom_params: HashMap<String, String>,
    context_id: String,
}

impl AuthorizationRequest {
    /// Build a request.
    ///
    /// Fails with [`ConfigError::MissingDeveloperToken`] when the developer
    /// token is empty or whitespace.
    pub fn build(
        developer_token: impl Into<String>,
        custom_params: HashMap<String, String>,
        context_id: impl Into<String>,
        start_screen_message: impl Into<String>,
        hide_start_screen: bool,
    ) -> Result<Self, ConfigError> {
        let developer_token = developer_token.into();
        if developer_token.trim().is_empty() {
            return Err(ConfigError::MissingDeveloperToken);
        }

        Ok(Self {
            developer_token,
            hide_start_screen,
            start_screen_message: start_screen_message.into(),
            custom_params,
            context_id: context_id.into(),
        })
    }

    pub fn developer_token(&self) -> &str {
        &self.developer_token
    }

    pub fn hide_start_screen(&self) -> bool {
        self.hide_start_screen
    }

    pub fn start_screen_message(&self) -> &str {
        &self.start_screen_message
    }

    pub fn custom_params(&self) -> &HashMap<String, String> {
        &self.custom_params
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

}

/// Per-attempt request settings other than the developer token.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDefaults {
    pub campaign_token: String,
    pub affiliate_token: String,
    pub context_id: String,
    pub start_screen_message: String,
    pub hide_start_screen: bool,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            campaign_token: DEFAULT_CAMPAIGN_TOKEN.to_string(),
            affiliate_token: DEFAULT_AFFILIATE_TOKEN.to_string(),
            context_id: DEFAULT_CONTEXT_ID.to_string(),
            start_screen_message: DEFAULT_START_SCREEN_MESSAGE.to_string(),
            hide_start_screen: false,
        }
    }
}

impl RequestDefaults {
    /// `ct` and `at` custom parameters.
    pub fn custom_params(&self) -> HashMap<String, String> {
        HashMap::from([
            (
                CAMPAIGN_TOKEN_PARAM.to_string(),
                self.campaign_token.clone(),
            ),
            (
                AFFILIATE_TOKEN_PARAM.to_string(),
                self.affiliate_token.clone(),
            ),
        ])
    }

    /// Build a request for `developer_token` from these settings.
    pub fn build_request(&self, developer_token: &str) -> Result<AuthorizationRequest, ConfigError> {
        AuthorizationRequest::build(
            developer_token,
            self.custom_params(),
            self.context_id.clone(),
            self.start_screen_message.clone(),
            self.hide_start_screen,
        )
    }
}
