//! Zoho OAuth Admin Login
//!
//! Authorization-code login for an admin portal backed by Zoho Accounts.
//!
//! # Features
//!
//! - Configuration resolved from the environment with every missing field reported
//! - Authorization URL for the Zoho consent page
//! - One-shot callback processing with per-code idempotency
//! - Data-center detection from the callback hints
//! - Code exchange through the backend admin API
//! - Profile refresh from the backend
//! - Persisted admin session with in-memory and file stores
//! - User-facing error classification
//!
//! # Example
//!
//! ```rust,ignore
//! use zoho_oauth_integration::{CallbackOutcome, CallbackParameters, ZohoAdminAuth};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads ZOHO_CLIENT_ID, ZOHO_CLIENT_SECRET, ZOHO_HOME_URL,
//!     // ZOHO_REDIRECT_URL and BACKEND_ADMIN_ENDPOINT
//!     let auth = ZohoAdminAuth::from_env()?;
//!
//!     println!("Sign in at: {}", auth.authorization_url()?);
//!
//!     // Later, on the redirect back
//!     let params = CallbackParameters::from_query("code=1000.abc&location=eu");
//!     match auth.handle_callback(&params).await {
//!         CallbackOutcome::Success { redirect_to, .. } => println!("Go to {}", redirect_to),
//!         CallbackOutcome::Failed { error, .. } => println!("{}: {}", error.title, error.message),
//!         CallbackOutcome::Skipped(_) => {}
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: configuration, callback, exchange and session data structures
//! - `error`: error hierarchy and the user-facing classifier
//! - `core`: HTTP transport, region resolution and the exchange guard
//! - `flows`: authorization URL, callback processing and profile refresh
//! - `session`: session stores and the admin route check
//! - `builders`: configuration builder and environment resolver
//! - `client`: high-level client combining all of the above

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod flows;
pub mod session;
pub mod types;

// Re-export main client
pub use client::{zoho_admin_auth, ZohoAdminAuth};

// Re-export builders
pub use builders::{
    oauth_config, resolve, resolve_from, ConfigSource, EnvConfigSource, OAuthConfigBuilder,
};

// Re-export errors
pub use error::{
    classify, default_classifier, is_technical, sanitize, ConfigurationError, ErrorClassifier,
    ErrorInfo, ErrorRule, ExchangeError, OAuthFlowError, OAuthFlowResult, ProviderError,
    StorageError, TransportError,
};

// Re-export types
pub use types::{
    // Config
    ConfigField, OAuthConfiguration, DEFAULT_SCOPE,
    // Callback
    CallbackParameters,
    // Exchange
    BackendExchangeRequest, BackendExchangeResponse,
    // Session
    SessionRecord, UserInfo,
};

// Re-export core components
pub use crate::core::{
    // Transport
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    ReqwestHttpTransport,
    // Region
    resolve_domain, DomainSuffix,
    // Guard
    marker_key, ExchangeGuard, SkipReason,
};

// Re-export flows
pub use flows::{
    build_auth_url, fetch_user_info, CallbackOutcome, CallbackProcessor, CallbackState,
};

// Re-export session management
pub use session::{
    active_admin_session, FileSessionStore, InMemorySessionStore, MockSessionStore, SessionStore,
};
