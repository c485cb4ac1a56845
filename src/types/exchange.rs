//! Backend Exchange Types
//!
//! Wire types for the backend code-exchange call.

use serde::{Deserialize, Serialize};

use super::UserInfo;

/// `source` value identifying admin-portal logins to the backend.
pub const EXCHANGE_SOURCE: &str = "admin_portal";

/// Body POSTed to the backend token endpoint.
#[derive(Clone, Serialize)]
pub struct BackendExchangeRequest {
    pub code: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub grant_type: &'static str,
    pub location: Option<String>,
    pub accounts_server: Option<String>,
    pub domain_suffix: String,
    /// RFC 3339 timestamp of the request.
    pub timestamp: String,
    pub user_agent: String,
    pub source: &'static str,
}

impl std::fmt::Debug for BackendExchangeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendExchangeRequest")
            .field("code", &"[REDACTED]")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("grant_type", &self.grant_type)
            .field("location", &self.location)
            .field("accounts_server", &self.accounts_server)
            .field("domain_suffix", &self.domain_suffix)
            .field("timestamp", &self.timestamp)
            .field("user_agent", &self.user_agent)
            .field("source", &self.source)
            .finish()
    }
}

/// Response returned by the backend token endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BackendExchangeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Raw profile. Decoded separately so a malformed profile cannot
    /// fail the exchange.
    #[serde(default)]
    pub user_info: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl BackendExchangeResponse {
    /// Decode the profile, if one was returned.
    pub fn decode_user_info(&self) -> Option<Result<UserInfo, serde_json::Error>> {
        self.user_info
            .clone()
            .map(serde_json::from_value::<UserInfo>)
    }

    /// Failure text assembled from `error` and `message`.
    pub fn failure_message(&self) -> String {
        match (self.error.as_deref(), self.message.as_deref()) {
            (Some(error), Some(message)) if error != message => format!("{}: {}", error, message),
            (Some(error), _) => error.to_string(),
            (None, Some(message)) => message.to_string(),
            (None, None) => "backend reported failure without details".to_string(),
        }
    }
}
