//! Session Types
//!
//! The persisted record of an authenticated admin session.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Session type written for admin logins.
pub const SESSION_TYPE_ADMIN: &str = "admin";

/// Identity used when the backend returns no user info.
pub const PLACEHOLDER_ADMIN_ID: &str = "admin";
pub const PLACEHOLDER_ADMIN_EMAIL: &str = "admin@localhost";
pub const PLACEHOLDER_ADMIN_NAME: &str = "Administrator";

/// Profile of the signed-in user.
///
/// Accepts both snake_case fields and Zoho's `ZUID`/`Email`/`Display_Name`
/// spellings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(
        default,
        alias = "ZUID",
        alias = "zuid",
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, alias = "Email", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, alias = "Display_Name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, alias = "First_Name", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, alias = "Last_Name", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl UserInfo {
    /// The placeholder administrator used when the backend omits a profile.
    pub fn placeholder_admin() -> Self {
        Self {
            id: Some(PLACEHOLDER_ADMIN_ID.to_string()),
            email: Some(PLACEHOLDER_ADMIN_EMAIL.to_string()),
            display_name: Some(PLACEHOLDER_ADMIN_NAME.to_string()),
            first_name: None,
            last_name: None,
            extra: HashMap::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        *self == Self::placeholder_admin()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Persisted admin session.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Always [`SESSION_TYPE_ADMIN`] for records written by this crate.
    #[serde(rename = "type")]
    pub session_type: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds, as reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    pub user_info: UserInfo,
    pub created_at: DateTime<Utc>,
    /// Data-center suffix the login came from, e.g. `.eu`.
    #[serde(default)]
    pub domain_suffix: String,
}

impl SessionRecord {
    /// Create a new admin session record stamped with the current time.
    pub fn admin(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: Option<u64>,
        user_info: UserInfo,
        domain_suffix: impl Into<String>,
    ) -> Self {
        Self {
            session_type: SESSION_TYPE_ADMIN.to_string(),
            access_token,
            refresh_token,
            expires_in,
            user_info,
            created_at: Utc::now(),
            domain_suffix: domain_suffix.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.session_type == SESSION_TYPE_ADMIN
    }

    /// Absolute expiry, if the backend reported a lifetime.
    ///
    /// A lifetime too large to represent as a timestamp yields `None`, so
    /// such a session never expires here.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expires_in?).ok()?;
        let lifetime = Duration::try_seconds(secs)?;
        self.created_at.checked_add_signed(lifetime)
    }

    /// Check if the session is expired at `now`. Sessions without a
    /// lifetime never expire here.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|exp| exp <= now).unwrap_or(false)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl std::fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecord")
            .field("session_type", &self.session_type)
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_in", &self.expires_in)
            .field("user_info", &self.user_info)
            .field("created_at", &self.created_at)
            .field("domain_suffix", &self.domain_suffix)
            .finish()
    }
}
