//! Configuration Builder
//!
//! Fluent builder for the admin login configuration.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

use crate::error::ConfigurationError;
use crate::types::{
    ConfigField, OAuthConfiguration, BACKEND_TOKEN_PATH, BACKEND_USER_INFO_PATH,
    DEFAULT_AUTHORIZATION_ENDPOINT, DEFAULT_SCOPE, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_ENDPOINT,
    DEFAULT_USER_AGENT, DEFAULT_USER_INFO_ENDPOINT,
};

/// Admin login configuration builder.
#[derive(Default)]
pub struct OAuthConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    home_url: Option<String>,
    redirect_url: Option<String>,
    authorization_endpoint: Option<String>,
    token_endpoint: Option<String>,
    user_info_endpoint: Option<String>,
    backend_token_endpoint: Option<String>,
    backend_user_info_endpoint: Option<String>,
    backend_admin_endpoint: Option<String>,
    scope: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl OAuthConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    /// Set application home URL.
    pub fn home_url(mut self, url: impl Into<String>) -> Self {
        self.home_url = Some(url.into());
        self
    }

    /// Set redirect (callback) URL.
    pub fn redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    /// Override the provider authorization endpoint.
    pub fn authorization_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.authorization_endpoint = Some(endpoint.into());
        self
    }

    /// Override the provider token endpoint.
    pub fn token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = Some(endpoint.into());
        self
    }

    /// Override the provider user-info endpoint.
    pub fn user_info_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.user_info_endpoint = Some(endpoint.into());
        self
    }

    /// Set backend token endpoint.
    pub fn backend_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.backend_token_endpoint = Some(endpoint.into());
        self
    }

    /// Set backend user-info endpoint.
    pub fn backend_user_info_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.backend_user_info_endpoint = Some(endpoint.into());
        self
    }

    /// Set backend admin endpoint.
    pub fn backend_admin_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.backend_admin_endpoint = Some(endpoint.into());
        self
    }

    /// Override the requested scope.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Set backend request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set user agent reported to the backend.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the configuration.
    ///
    /// Every missing mandatory field is reported in a single
    /// [`ConfigurationError::MissingRequired`].
    pub fn build(self) -> Result<OAuthConfiguration, ConfigurationError> {
        let client_id = present(self.client_id);
        let client_secret = self
            .client_secret
            .filter(|s| !s.expose_secret().trim().is_empty());
        let home_url = present(self.home_url);
        let redirect_url = present(self.redirect_url);
        let backend_admin_endpoint = present(self.backend_admin_endpoint);

        let missing: Vec<String> = [
            (ConfigField::ClientId, client_id.is_none()),
            (ConfigField::ClientSecret, client_secret.is_none()),
            (ConfigField::HomeUrl, home_url.is_none()),
            (ConfigField::RedirectUrl, redirect_url.is_none()),
            (ConfigField::BackendAdminEndpoint, backend_admin_endpoint.is_none()),
        ]
        .into_iter()
        .filter(|(_, is_missing)| *is_missing)
        .map(|(field, _)| field.describe())
        .collect();

        let (
            Some(client_id),
            Some(client_secret),
            Some(home_url),
            Some(redirect_url),
            Some(backend_admin_endpoint),
        ) = (
            client_id,
            client_secret,
            home_url,
            redirect_url,
            backend_admin_endpoint,
        )
        else {
            return Err(ConfigurationError::MissingRequired { fields: missing });
        };

        let backend_base = backend_admin_endpoint.trim_end_matches('/').to_string();
        let config = OAuthConfiguration {
            client_id,
            client_secret,
            home_url,
            redirect_url,
            authorization_endpoint: present(self.authorization_endpoint)
                .unwrap_or_else(|| DEFAULT_AUTHORIZATION_ENDPOINT.to_string()),
            token_endpoint: present(self.token_endpoint)
                .unwrap_or_else(|| DEFAULT_TOKEN_ENDPOINT.to_string()),
            user_info_endpoint: present(self.user_info_endpoint)
                .unwrap_or_else(|| DEFAULT_USER_INFO_ENDPOINT.to_string()),
            backend_token_endpoint: present(self.backend_token_endpoint)
                .unwrap_or_else(|| format!("{}{}", backend_base, BACKEND_TOKEN_PATH)),
            backend_user_info_endpoint: present(self.backend_user_info_endpoint)
                .unwrap_or_else(|| format!("{}{}", backend_base, BACKEND_USER_INFO_PATH)),
            backend_admin_endpoint,
            scope: present(self.scope).unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            user_agent: present(self.user_agent).unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        };

        validate_urls(&config)?;
        Ok(config)
    }
}

/// Trimmed value, or `None` when absent or blank.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_urls(config: &OAuthConfiguration) -> Result<(), ConfigurationError> {
    let urls = [
        &config.home_url,
        &config.redirect_url,
        &config.authorization_endpoint,
        &config.token_endpoint,
        &config.user_info_endpoint,
        &config.backend_token_endpoint,
        &config.backend_user_info_endpoint,
        &config.backend_admin_endpoint,
    ];

    for url in urls {
        let parsed = Url::parse(url).map_err(|e| ConfigurationError::InvalidEndpoint {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigurationError::InvalidEndpoint {
                url: url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
    }

    Ok(())
}

/// Create a new configuration builder.
pub fn oauth_config() -> OAuthConfigBuilder {
    OAuthConfigBuilder::new()
}
