//! Data-Center Resolution
//!
//! Zoho serves accounts from several regional data centers. The callback
//! carries `location` and `accounts-server` hints identifying the one the
//! user signed in through.

use serde::{Deserialize, Serialize};

use crate::types::CallbackParameters;

/// Suffix used when no hint is present.
pub const DEFAULT_DOMAIN_SUFFIX: &str = ".com";

/// Known `accounts-server` fragments and their suffixes. Order matters:
/// `zoho.com.au` must be tested before `zoho.com`.
pub const KNOWN_DATA_CENTERS: [(&str, &str); 7] = [
    ("zoho.eu", ".eu"),
    ("zoho.com.au", ".com.au"),
    ("zoho.jp", ".jp"),
    ("zoho.uk", ".uk"),
    ("zohocloud.ca", ".ca"),
    ("zoho.sa", ".sa"),
    ("zoho.com", ".com"),
];

/// Regional domain suffix such as `.com`, `.eu` or `.in`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainSuffix(String);

impl DomainSuffix {
    /// Build from a bare suffix, with or without the leading dot.
    pub fn new(suffix: &str) -> Self {
        let bare = suffix.trim().trim_start_matches('.').to_lowercase();
        Self(format!(".{}", bare))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The accounts host for this data center, e.g. `accounts.zoho.eu`.
    pub fn accounts_host(&self) -> String {
        format!("accounts.zoho{}", self.0)
    }

    /// Derive the suffix from callback hints.
    pub fn from_callback(params: &CallbackParameters) -> Self {
        resolve_domain(params.location.as_deref(), params.accounts_server.as_deref())
    }
}

impl Default for DomainSuffix {
    fn default() -> Self {
        Self(DEFAULT_DOMAIN_SUFFIX.to_string())
    }
}

impl std::fmt::Display for DomainSuffix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the data-center suffix.
///
/// `location` wins over `accounts_server`; an unrecognised accounts server
/// or no hint at all yields `.com`.
pub fn resolve_domain(location: Option<&str>, accounts_server: Option<&str>) -> DomainSuffix {
    if let Some(location) = location.map(str::trim).filter(|l| !l.is_empty()) {
        return DomainSuffix::new(location);
    }

    if let Some(server) = accounts_server {
        let server = server.to_lowercase();
        if let Some((_, suffix)) = KNOWN_DATA_CENTERS
            .iter()
            .find(|(fragment, _)| server.contains(fragment))
        {
            return DomainSuffix::new(suffix);
        }
    }

    DomainSuffix::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_wins() {
        let suffix = resolve_domain(Some("in"), Some("https://accounts.zoho.eu"));
        assert_eq!(suffix.as_str(), ".in");
        assert_eq!(suffix.accounts_host(), "accounts.zoho.in");
    }

    #[test]
    fn test_accounts_server_table() {
        let cases = [
            ("https://accounts.zoho.eu", ".eu"),
            ("https://accounts.zoho.com.au", ".com.au"),
            ("https://accounts.zoho.jp", ".jp"),
            ("https://accounts.zoho.uk", ".uk"),
            ("https://accounts.zohocloud.ca", ".ca"),
            ("https://accounts.zoho.sa", ".sa"),
            ("https://accounts.zoho.com", ".com"),
            ("HTTPS://ACCOUNTS.ZOHO.JP", ".jp"),
        ];
        for (server, expected) in cases {
            assert_eq!(resolve_domain(None, Some(server)).as_str(), expected, "{server}");
        }
    }

    #[test]
    fn test_defaults_to_com() {
        assert_eq!(resolve_domain(None, None).as_str(), ".com");
        assert_eq!(resolve_domain(Some("  "), None).as_str(), ".com");
        assert_eq!(
            resolve_domain(None, Some("https://accounts.example.org")).as_str(),
            ".com"
        );
    }

    #[test]
    fn test_suffix_normalisation() {
        assert_eq!(DomainSuffix::new(".EU").as_str(), ".eu");
        assert_eq!(DomainSuffix::new("com.au").to_string(), ".com.au");
    }

    #[test]
    fn test_from_callback() {
        let params = CallbackParameters::from_query("code=x&accounts-server=https%3A%2F%2Faccounts.zoho.jp");
        assert_eq!(DomainSuffix::from_callback(&params).as_str(), ".jp");
    }
}
