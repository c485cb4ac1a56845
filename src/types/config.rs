//! Configuration Types
//!
//! Resolved configuration for the Zoho admin login flow.

use secrecy::SecretString;
use std::time::Duration;

/// Default Zoho authorization endpoint.
pub const DEFAULT_AUTHORIZATION_ENDPOINT: &str = "https://accounts.zoho.com/oauth/v2/auth";
/// Default Zoho token endpoint.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://accounts.zoho.com/oauth/v2/token";
/// Default Zoho user-info endpoint.
pub const DEFAULT_USER_INFO_ENDPOINT: &str = "https://accounts.zoho.com/oauth/user/info";
/// The only scope the admin login requests.
pub const DEFAULT_SCOPE: &str = "AaaServer.profile.READ";
/// Backend token endpoint path, relative to the backend admin endpoint.
pub const BACKEND_TOKEN_PATH: &str = "/oauth/token";
/// Backend user-info endpoint path, relative to the backend admin endpoint.
pub const BACKEND_USER_INFO_PATH: &str = "/oauth/userinfo";
/// Route the browser lands on after a successful login.
pub const ADMIN_DASHBOARD_PATH: &str = "/admin/dashboard";
/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default user agent sent to the backend.
pub const DEFAULT_USER_AGENT: &str = concat!("zoho-oauth-integration/", env!("CARGO_PKG_VERSION"));

/// A configuration field, with its environment variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigField {
    ClientId,
    ClientSecret,
    HomeUrl,
    RedirectUrl,
    AuthorizationEndpoint,
    TokenEndpoint,
    UserInfoEndpoint,
    BackendTokenEndpoint,
    BackendUserInfoEndpoint,
    BackendAdminEndpoint,
    Scope,
    TimeoutSecs,
}

impl ConfigField {
    /// Fields that must be supplied.
    pub const REQUIRED: [ConfigField; 5] = [
        ConfigField::ClientId,
        ConfigField::ClientSecret,
        ConfigField::HomeUrl,
        ConfigField::RedirectUrl,
        ConfigField::BackendAdminEndpoint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientId => "client_id",
            Self::ClientSecret => "client_secret",
            Self::HomeUrl => "home_url",
            Self::RedirectUrl => "redirect_url",
            Self::AuthorizationEndpoint => "authorization_endpoint",
            Self::TokenEndpoint => "token_endpoint",
            Self::UserInfoEndpoint => "user_info_endpoint",
            Self::BackendTokenEndpoint => "backend_token_endpoint",
            Self::BackendUserInfoEndpoint => "backend_user_info_endpoint",
            Self::BackendAdminEndpoint => "backend_admin_endpoint",
            Self::Scope => "scope",
            Self::TimeoutSecs => "timeout_secs",
        }
    }

    pub fn env_var(&self) -> &'static str {
        match self {
            Self::ClientId => "ZOHO_CLIENT_ID",
            Self::ClientSecret => "ZOHO_CLIENT_SECRET",
            Self::HomeUrl => "ZOHO_HOME_URL",
            Self::RedirectUrl => "ZOHO_REDIRECT_URL",
            Self::AuthorizationEndpoint => "ZOHO_AUTH_URL",
            Self::TokenEndpoint => "ZOHO_TOKEN_URL",
            Self::UserInfoEndpoint => "ZOHO_USER_INFO_URL",
            Self::BackendTokenEndpoint => "BACKEND_TOKEN_ENDPOINT",
            Self::BackendUserInfoEndpoint => "BACKEND_USER_INFO_ENDPOINT",
            Self::BackendAdminEndpoint => "BACKEND_ADMIN_ENDPOINT",
            Self::Scope => "ZOHO_SCOPE",
            Self::TimeoutSecs => "OAUTH_HTTP_TIMEOUT_SECS",
        }
    }

    /// Name used in error messages, e.g. `client_id (ZOHO_CLIENT_ID)`.
    pub fn describe(&self) -> String {
        format!("{} ({})", self.as_str(), self.env_var())
    }
}

impl std::fmt::Display for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zoho admin login configuration.
///
/// Built once by the resolver or builder and never mutated afterwards.
#[derive(Clone)]
pub struct OAuthConfiguration {
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: SecretString,
    /// Application home URL.
    pub home_url: String,
    /// Registered redirect URL (the callback page).
    pub redirect_url: String,
    /// Provider authorization endpoint.
    pub authorization_endpoint: String,
    /// Provider token endpoint.
    pub token_endpoint: String,
    /// Provider user-info endpoint.
    pub user_info_endpoint: String,
    /// Backend endpoint performing the code exchange.
    pub backend_token_endpoint: String,
    /// Backend endpoint proxying user info.
    pub backend_user_info_endpoint: String,
    /// Backend admin API base.
    pub backend_admin_endpoint: String,
    /// Requested scope.
    pub scope: String,
    /// HTTP timeout for backend calls.
    pub timeout: Duration,
    /// User agent reported to the backend.
    pub user_agent: String,
}

impl OAuthConfiguration {
    /// Where to send the browser after a successful login.
    pub fn dashboard_url(&self) -> String {
        format!("{}{}", self.home_url.trim_end_matches('/'), ADMIN_DASHBOARD_PATH)
    }
}

impl std::fmt::Debug for OAuthConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfiguration")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("home_url", &self.home_url)
            .field("redirect_url", &self.redirect_url)
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .field("user_info_endpoint", &self.user_info_endpoint)
            .field("backend_token_endpoint", &self.backend_token_endpoint)
            .field("backend_user_info_endpoint", &self.backend_user_info_endpoint)
            .field("backend_admin_endpoint", &self.backend_admin_endpoint)
            .field("scope", &self.scope)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
