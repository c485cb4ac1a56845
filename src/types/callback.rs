//! Callback Types
//!
//! Parameters the identity provider sends back on the redirect.

use url::Url;

/// Callback parameters from the authorization redirect.
///
/// Empty values are treated as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParameters {
    /// Authorization code (if success).
    pub code: Option<String>,
    /// Error code (if authorization failed).
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
    /// `accounts-server` hint, e.g. `https://accounts.zoho.eu`.
    pub accounts_server: Option<String>,
    /// `location` hint, e.g. `in`.
    pub location: Option<String>,
}

impl CallbackParameters {
    /// Parse callback parameters from a URL.
    pub fn from_url(url: &Url) -> Self {
        Self::from_pairs(url.query_pairs())
    }

    /// Parse callback parameters from a URL string.
    pub fn from_url_str(url_str: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(url_str)?;
        Ok(Self::from_url(&url))
    }

    /// Parse callback parameters from a raw query string (with or
    /// without the leading `?`).
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    fn from_pairs<'a>(
        pairs: impl Iterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
    ) -> Self {
        let mut params = Self::default();

        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let value = Some(value.to_string());
            match key.as_ref() {
                "code" => params.code = value,
                "error" => params.error = value,
                "error_description" => params.error_description = value,
                "accounts-server" => params.accounts_server = value,
                "location" => params.location = value,
                _ => {}
            }
        }

        params
    }

    /// Check if callback contains an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Check if the callback carries nothing to act on.
    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.error.is_none()
    }
}
