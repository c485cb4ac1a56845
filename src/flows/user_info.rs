//! Profile Refresh
//!
//! Fetches the signed-in administrator's profile from the backend.

use std::collections::HashMap;
use tracing::debug;

use crate::core::{HttpMethod, HttpRequest, HttpTransport};
use crate::error::{ExchangeError, OAuthFlowError};
use crate::types::{OAuthConfiguration, UserInfo};

/// GET the backend user-info endpoint with the session's access token.
///
/// The backend may answer with the profile itself or wrap it as
/// `{"user_info": {...}}`.
pub async fn fetch_user_info<T: HttpTransport + ?Sized>(
    config: &OAuthConfiguration,
    transport: &T,
    access_token: &str,
) -> Result<UserInfo, OAuthFlowError> {
    let mut headers = HashMap::new();
    headers.insert("accept".to_string(), "application/json".to_string());
    headers.insert("user-agent".to_string(), config.user_agent.clone());
    headers.insert(
        "authorization".to_string(),
        format!("Bearer {}", access_token),
    );

    let request = HttpRequest {
        method: HttpMethod::Get,
        url: config.backend_user_info_endpoint.clone(),
        headers,
        body: None,
        timeout: Some(config.timeout),
    };

    debug!(endpoint = %request.url, "Fetching admin profile");
    let response = transport.send(request).await?;

    if !response.is_success() {
        return Err(ExchangeError::BackendStatus {
            status: response.status,
            body: response.body,
        }
        .into());
    }

    let invalid = |e: serde_json::Error| ExchangeError::InvalidResponse {
        message: e.to_string(),
    };
    let mut value: serde_json::Value = serde_json::from_str(&response.body).map_err(invalid)?;
    if let Some(inner) = value
        .get_mut("user_info")
        .filter(|v| v.is_object())
        .map(serde_json::Value::take)
    {
        value = inner;
    }
    if !value.is_object() {
        return Err(ExchangeError::InvalidResponse {
            message: "user info is not a JSON object".to_string(),
        }
        .into());
    }

    let user_info: UserInfo = serde_json::from_value(value).map_err(invalid)?;
    Ok(user_info)
}
