//! Error Classifier
//!
//! Maps raw error text to user-facing [`ErrorInfo`] using an ordered rule
//! table. Rules are plain data: the built-in table can be replaced by one
//! loaded from JSON, and each rule can be exercised on its own.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{ExchangeError, OAuthFlowError};

/// Maximum depth of embedded-JSON `message` recursion.
const MAX_EMBEDDED_DEPTH: usize = 4;

/// User-facing description of an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Short heading.
    pub title: String,
    /// User-facing message.
    pub message: String,
    /// What the user can do about it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Whether the underlying problem is developer-facing.
    #[serde(default)]
    pub technical: bool,
}

impl ErrorInfo {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        suggestion: Option<&str>,
        technical: bool,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            suggestion: suggestion.map(String::from),
            technical,
        }
    }

    /// The fallback used when no rule matches.
    pub fn something_went_wrong() -> Self {
        Self::new(
            "Something Went Wrong",
            "An unexpected error occurred during sign-in.",
            Some("Please try signing in again. If the problem persists, contact support."),
            false,
        )
    }
}

/// A classification rule: if any pattern occurs in the error text
/// (case-insensitive), the rule's info is the result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRule {
    pub patterns: Vec<String>,
    pub info: ErrorInfo,
}

impl ErrorRule {
    pub fn new(patterns: &[&str], info: ErrorInfo) -> Self {
        Self {
            patterns: patterns.iter().map(|p| p.to_lowercase()).collect(),
            info,
        }
    }

    /// `lowered` must already be lowercase.
    pub fn matches(&self, lowered: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| !p.is_empty() && lowered.contains(&p.to_lowercase()))
    }
}

struct RuleSpec {
    patterns: &'static [&'static str],
    title: &'static str,
    message: &'static str,
    suggestion: &'static str,
    technical: bool,
}

/// Built-in rules, in evaluation order.
const DEFAULT_RULES: &[RuleSpec] = &[
    RuleSpec {
        patterns: &[
            "missing required configuration",
            "configuration error",
            "invalid endpoint url",
            "unsupported scope",
        ],
        title: "Configuration Error",
        message: "The sign-in service is not configured correctly.",
        suggestion: "Contact the site administrator to fix the OAuth settings.",
        technical: true,
    },
    RuleSpec {
        patterns: &["user not found", "no admin account", "not registered"],
        title: "Account Not Found",
        message: "No administrator account is associated with this Zoho login.",
        suggestion: "Sign in with an authorized administrator account or contact support.",
        technical: false,
    },
    RuleSpec {
        patterns: &["access_denied", "user denied", "user cancelled", "user canceled"],
        title: "Sign-In Cancelled",
        message: "The Zoho sign-in was cancelled or permission was not granted.",
        suggestion: "Start the sign-in again and approve the requested access.",
        technical: false,
    },
    RuleSpec {
        patterns: &["invalid_code", "invalid_grant", "code expired", "expired code"],
        title: "Login Link Expired",
        message: "The sign-in code has expired or was already used.",
        suggestion: "Start the sign-in again to get a fresh code.",
        technical: false,
    },
    RuleSpec {
        patterns: &["invalid_client", "unauthorized_client"],
        title: "Application Not Authorized",
        message: "This application is not recognized by Zoho.",
        suggestion: "Contact the site administrator to verify the OAuth client settings.",
        technical: true,
    },
    RuleSpec {
        patterns: &["invalid_redirect_uri", "redirect_uri_mismatch"],
        title: "Redirect Mismatch",
        message: "The sign-in redirect address is not registered with Zoho.",
        suggestion: "Contact the site administrator to update the registered redirect URL.",
        technical: true,
    },
    RuleSpec {
        patterns: &["invalid_scope"],
        title: "Invalid Permissions Requested",
        message: "The sign-in asked Zoho for permissions it does not recognize.",
        suggestion: "Contact the site administrator to correct the requested scope.",
        technical: true,
    },
    RuleSpec {
        patterns: &["timed out", "timeout"],
        title: "Request Timed Out",
        message: "The sign-in server took too long to respond.",
        suggestion: "Check your connection and try again in a moment.",
        technical: false,
    },
    RuleSpec {
        patterns: &[
            "failed to fetch",
            "networkerror",
            "network error",
            "cors",
            "connection refused",
            "econnrefused",
            "err_connection_refused",
            "error sending request",
            "connection failed",
            "dns error",
        ],
        title: "Cannot Reach Server",
        message: "We could not connect to the sign-in server.",
        suggestion: "Check your internet connection and try again.",
        technical: true,
    },
    RuleSpec {
        patterns: &["401", "unauthorized"],
        title: "Access Denied",
        message: "Your Zoho account is not authorized to access the admin portal.",
        suggestion: "Sign in with an administrator account.",
        technical: false,
    },
    RuleSpec {
        patterns: &["403", "forbidden"],
        title: "Permission Denied",
        message: "You do not have permission to perform this action.",
        suggestion: "Contact an administrator to request access.",
        technical: false,
    },
    RuleSpec {
        patterns: &["404", "not found"],
        title: "Service Not Found",
        message: "The sign-in service could not be found.",
        suggestion: "Try again later or contact support.",
        technical: true,
    },
    RuleSpec {
        patterns: &["429", "too many requests", "rate limit"],
        title: "Too Many Attempts",
        message: "There have been too many sign-in attempts.",
        suggestion: "Wait a few minutes before trying again.",
        technical: false,
    },
    RuleSpec {
        patterns: &[
            "500",
            "502",
            "503",
            "504",
            "server_error",
            "internal server error",
            "service unavailable",
            "temporarily_unavailable",
        ],
        title: "Server Error",
        message: "The sign-in server ran into a problem.",
        suggestion: "Please try again in a few minutes.",
        technical: false,
    },
    RuleSpec {
        patterns: &["400", "bad request", "invalid_request"],
        title: "Invalid Request",
        message: "The sign-in request was not accepted.",
        suggestion: "Start the sign-in again from the login page.",
        technical: true,
    },
];

/// Substrings that mark a message as developer-facing.
const TECHNICAL_MARKERS: &[&str] = &[
    "api error",
    "http",
    "status",
    "json",
    "cors",
    "fetch",
    "econnrefused",
    "error sending request",
    "typeerror",
    "syntaxerror",
    "stack",
    "exception",
    "undefined",
    "panicked",
    "{",
];

/// The built-in rule table as owned rules.
pub fn default_rules() -> Vec<ErrorRule> {
    DEFAULT_RULES
        .iter()
        .map(|spec| {
            ErrorRule::new(
                spec.patterns,
                ErrorInfo::new(spec.title, spec.message, Some(spec.suggestion), spec.technical),
            )
        })
        .collect()
}

/// Ordered, data-driven error classifier.
#[derive(Clone, Debug)]
pub struct ErrorClassifier {
    rules: Vec<ErrorRule>,
    fallback: ErrorInfo,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl ErrorClassifier {
    /// Create a classifier from rules, evaluated in the given order.
    pub fn new(rules: Vec<ErrorRule>) -> Self {
        Self {
            rules,
            fallback: ErrorInfo::something_went_wrong(),
        }
    }

    /// Load a rule table from a JSON array of rules.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let rules: Vec<ErrorRule> = serde_json::from_str(json)?;
        Ok(Self::new(rules))
    }

    /// Replace the fallback info.
    pub fn with_fallback(mut self, fallback: ErrorInfo) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn rules(&self) -> &[ErrorRule] {
        &self.rules
    }

    /// Classify raw error text.
    pub fn classify(&self, raw: &str) -> ErrorInfo {
        self.classify_nested(raw, 0)
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Classify raw error text, or `None` when no rule matches.
    pub fn try_classify(&self, raw: &str) -> Option<ErrorInfo> {
        self.classify_nested(raw, 0)
    }

    /// Classify any error by its display text.
    pub fn classify_error(&self, error: &dyn std::error::Error) -> ErrorInfo {
        self.classify(&error.to_string())
    }

    /// Classify a login failure.
    ///
    /// Backend status errors are matched on the body's `error`/`message`
    /// fields, then on the status line, and only then on the whole body,
    /// so identifiers or timestamps in the body cannot pose as status codes.
    pub fn classify_flow_error(&self, error: &OAuthFlowError) -> ErrorInfo {
        if let OAuthFlowError::Exchange(ExchangeError::BackendStatus { status, body }) = error {
            let from_fields = body_fields(body).and_then(|fields| self.try_classify(&fields));
            if let Some(info) = from_fields
                .or_else(|| self.try_classify(&format!("Backend API error: {}", status)))
            {
                return info;
            }
        }
        self.classify(&error.to_string())
    }

    fn classify_nested(&self, raw: &str, depth: usize) -> Option<ErrorInfo> {
        let lowered = raw.to_lowercase();
        if let Some(rule) = self.rules.iter().find(|rule| rule.matches(&lowered)) {
            return Some(rule.info.clone());
        }

        if depth >= MAX_EMBEDDED_DEPTH {
            return None;
        }

        let nested = embedded_message(raw)?;
        self.classify_nested(&nested, depth + 1)
    }
}

static DEFAULT_CLASSIFIER: Lazy<ErrorClassifier> = Lazy::new(ErrorClassifier::default);

/// Classifier with the built-in rule table.
pub fn default_classifier() -> &'static ErrorClassifier {
    &DEFAULT_CLASSIFIER
}

/// Classify raw error text with the built-in rule table.
pub fn classify(raw: &str) -> ErrorInfo {
    DEFAULT_CLASSIFIER.classify(raw)
}

/// Whether the raw message contains developer-facing text worth hiding
/// behind a "show technical details" disclosure.
pub fn is_technical(raw: &str) -> bool {
    let lowered = raw.to_lowercase();
    TECHNICAL_MARKERS.iter().any(|marker| lowered.contains(marker))
}

static STACK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s+at\s.*$").expect("valid stack line pattern"));
static ERROR_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:[a-z ]*error:\s*)+").expect("valid error prefix pattern")
});
static STATUS_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:http\s*)?\d{3}\b\s*[-:]?\s*").expect("valid status prefix pattern")
});
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Strip status codes, error-type prefixes, stack-trace lines and embedded
/// JSON from raw error text. An embedded JSON object is replaced by its
/// `message` field when it has one.
pub fn sanitize(raw: &str) -> String {
    let without_stack = STACK_LINE.replace_all(raw, "");

    let mut text = match json_span(&without_stack) {
        Some((start, end)) => {
            let replacement = embedded_message(&without_stack).unwrap_or_default();
            format!(
                "{}{}{}",
                &without_stack[..start],
                replacement,
                &without_stack[end..]
            )
        }
        None => without_stack.into_owned(),
    };

    loop {
        let trimmed = text.trim_start();
        let stripped = ERROR_PREFIX.replace(trimmed, "");
        let stripped = STATUS_PREFIX.replace(&stripped, "").into_owned();
        if stripped == text {
            break;
        }
        text = stripped;
    }

    WHITESPACE
        .replace_all(&text, " ")
        .trim_matches(|c: char| c.is_whitespace() || c == '-' || c == ':')
        .to_string()
}

/// Byte range of the outermost `{...}` in `raw`.
fn json_span(raw: &str) -> Option<(usize, usize)> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then_some((start, end + 1))
}

/// The `error` and `message` strings of a JSON object body.
fn body_fields(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let fields: Vec<&str> = ["error", "message"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .filter(|v| !v.trim().is_empty())
        .collect();
    (!fields.is_empty()).then(|| fields.join(": "))
}

/// The `message` field of an embedded JSON object, if any.
fn embedded_message(raw: &str) -> Option<String> {
    let (start, end) = json_span(raw)?;
    let value: serde_json::Value = serde_json::from_str(&raw[start..end]).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.trim().is_empty())
        .map(String::from)
}
