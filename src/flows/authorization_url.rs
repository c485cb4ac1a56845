//! Authorization URL
//!
//! Builds the Zoho authorization redirect that starts the admin login.

use url::Url;

use crate::error::ConfigurationError;
use crate::types::{OAuthConfiguration, DEFAULT_SCOPE};

/// Registrable domains of Zoho's accounts servers.
pub const ZOHO_ACCOUNTS_DOMAINS: [&str; 9] = [
    "zoho.com",
    "zoho.eu",
    "zoho.in",
    "zoho.com.au",
    "zoho.jp",
    "zoho.uk",
    "zohocloud.ca",
    "zoho.sa",
    "zoho.com.cn",
];

/// Build the authorization URL for `config`.
///
/// Query parameters are emitted in a fixed order: `response_type`,
/// `client_id`, `scope`, `redirect_uri`, `access_type`.
pub fn build_auth_url(config: &OAuthConfiguration) -> Result<Url, ConfigurationError> {
    validate_scope(&config.scope)?;
    let mut url = parse_provider_endpoint(&config.authorization_endpoint)?;
    parse_provider_endpoint(&config.token_endpoint)?;

    url.query_pairs_mut()
        .clear()
        .append_pair("response_type", "code")
        .append_pair("client_id", &config.client_id)
        .append_pair("scope", &config.scope)
        .append_pair("redirect_uri", &config.redirect_url)
        .append_pair("access_type", "offline");

    Ok(url)
}

fn validate_scope(scope: &str) -> Result<(), ConfigurationError> {
    if scope != DEFAULT_SCOPE {
        return Err(ConfigurationError::InvalidScope {
            scope: scope.to_string(),
            expected: DEFAULT_SCOPE.to_string(),
        });
    }
    Ok(())
}

/// Parse an endpoint and require HTTPS on a Zoho accounts domain.
fn parse_provider_endpoint(endpoint: &str) -> Result<Url, ConfigurationError> {
    let invalid = |reason: &str| ConfigurationError::InvalidEndpoint {
        url: endpoint.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(endpoint).map_err(|e| invalid(&e.to_string()))?;
    if url.scheme() != "https" {
        return Err(invalid("provider endpoints must use https"));
    }

    let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
    if !is_zoho_host(host) {
        return Err(invalid("host is not a Zoho accounts domain"));
    }

    Ok(url)
}

pub fn is_zoho_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    ZOHO_ACCOUNTS_DOMAINS.iter().any(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::oauth_config;

    fn config() -> OAuthConfiguration {
        oauth_config()
            .client_id("X")
            .client_secret("secret")
            .home_url("http://localhost:8082")
            .redirect_url("http://localhost:8082/oauth/callback")
            .backend_admin_endpoint("http://localhost:5000/api/admin")
            .scope("AaaServer.profile.READ")
            .build()
            .unwrap()
    }

    #[test]
    fn test_exact_authorization_url() {
        let url = build_auth_url(&config()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://accounts.zoho.com/oauth/v2/auth?response_type=code&client_id=X&scope=AaaServer.profile.READ&redirect_uri=http%3A%2F%2Flocalhost%3A8082%2Foauth%2Fcallback&access_type=offline"
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let config = config();
        assert_eq!(build_auth_url(&config), build_auth_url(&config));
    }

    #[test]
    fn test_rejects_other_scope() {
        let mut config = config();
        config.scope = "ZohoCRM.modules.ALL".to_string();
        assert!(matches!(
            build_auth_url(&config),
            Err(ConfigurationError::InvalidScope { .. })
        ));
    }

    #[test]
    fn test_rejects_foreign_endpoints() {
        let mut config = config();
        config.authorization_endpoint = "https://evil.example.com/oauth/v2/auth".to_string();
        assert!(matches!(
            build_auth_url(&config),
            Err(ConfigurationError::InvalidEndpoint { .. })
        ));

        let mut config = self::config();
        config.token_endpoint = "https://notzoho.com/oauth/v2/token".to_string();
        assert!(build_auth_url(&config).is_err());

        let mut config = self::config();
        config.authorization_endpoint = "http://accounts.zoho.com/oauth/v2/auth".to_string();
        assert!(build_auth_url(&config).is_err());
    }

    #[test]
    fn test_is_zoho_host() {
        assert!(is_zoho_host("accounts.zoho.com"));
        assert!(is_zoho_host("accounts.zoho.com.au"));
        assert!(is_zoho_host("ACCOUNTS.ZOHOCLOUD.CA"));
        assert!(is_zoho_host("zoho.eu"));
        assert!(!is_zoho_host("notzoho.com"));
        assert!(!is_zoho_host("zoho.com.evil.io"));
    }
}
