//! Configuration Resolver
//!
//! Reads the admin login configuration from the environment (or any other
//! key-value source) and validates it on every call.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use super::config::OAuthConfigBuilder;
use crate::error::ConfigurationError;
use crate::types::{ConfigField, OAuthConfiguration};

/// Source of raw configuration values, keyed by environment variable name.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvConfigSource;

impl ConfigSource for EnvConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl ConfigSource for HashMap<&str, &str> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).map(|v| v.to_string())
    }
}

impl OAuthConfigBuilder {
    /// Populate a builder from a configuration source.
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, ConfigurationError> {
        let mut builder = Self::new();
        let value = |field: ConfigField| source.get(field.env_var());

        if let Some(v) = value(ConfigField::ClientId) {
            builder = builder.client_id(v);
        }
        if let Some(v) = value(ConfigField::ClientSecret) {
            builder = builder.client_secret(v);
        }
        if let Some(v) = value(ConfigField::HomeUrl) {
            builder = builder.home_url(v);
        }
        if let Some(v) = value(ConfigField::RedirectUrl) {
            builder = builder.redirect_url(v);
        }
        if let Some(v) = value(ConfigField::AuthorizationEndpoint) {
            builder = builder.authorization_endpoint(v);
        }
        if let Some(v) = value(ConfigField::TokenEndpoint) {
            builder = builder.token_endpoint(v);
        }
        if let Some(v) = value(ConfigField::UserInfoEndpoint) {
            builder = builder.user_info_endpoint(v);
        }
        if let Some(v) = value(ConfigField::BackendTokenEndpoint) {
            builder = builder.backend_token_endpoint(v);
        }
        if let Some(v) = value(ConfigField::BackendUserInfoEndpoint) {
            builder = builder.backend_user_info_endpoint(v);
        }
        if let Some(v) = value(ConfigField::BackendAdminEndpoint) {
            builder = builder.backend_admin_endpoint(v);
        }
        if let Some(v) = value(ConfigField::Scope) {
            builder = builder.scope(v);
        }
        if let Some(v) = value(ConfigField::TimeoutSecs).filter(|v| !v.trim().is_empty()) {
            let secs: u64 = v.trim().parse().map_err(|_| ConfigurationError::InvalidValue {
                field: ConfigField::TimeoutSecs.describe(),
                message: format!("expected a whole number of seconds, got '{}'", v),
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(builder)
    }
}

/// Resolve configuration from `source`, validating on every call.
pub fn resolve_from(source: &dyn ConfigSource) -> Result<OAuthConfiguration, ConfigurationError> {
    let config = OAuthConfigBuilder::from_source(source)?.build()?;
    debug!(
        client_id = %config.client_id,
        backend_token_endpoint = %config.backend_token_endpoint,
        scope = %config.scope,
        "Resolved admin OAuth configuration"
    );
    Ok(config)
}

/// Resolve configuration from the process environment.
pub fn resolve() -> Result<OAuthConfiguration, ConfigurationError> {
    resolve_from(&EnvConfigSource)
}
