//! Admin Login Client
//!
//! High-level entry point combining configuration, the login flows and
//! the session store.

use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::builders::resolve;
use crate::core::{ExchangeGuard, HttpTransport, ReqwestHttpTransport, MAX_RESPONSE_SIZE};
use crate::error::{ConfigurationError, ErrorClassifier, OAuthFlowError};
use crate::flows::{
    build_auth_url, fetch_user_info, CallbackOutcome, CallbackProcessor, CallbackState,
};
use crate::session::{active_admin_session, InMemorySessionStore, SessionStore};
use crate::types::{CallbackParameters, OAuthConfiguration, SessionRecord};

/// Zoho admin login client.
pub struct ZohoAdminAuth<
    T: HttpTransport = ReqwestHttpTransport,
    S: SessionStore = InMemorySessionStore,
> {
    config: OAuthConfiguration,
    transport: Arc<T>,
    session_store: Arc<S>,
    processor: CallbackProcessor<T, S>,
}

impl ZohoAdminAuth<ReqwestHttpTransport, InMemorySessionStore> {
    /// Create a client with the reqwest transport and an in-memory store.
    pub fn new(config: OAuthConfiguration) -> Result<Self, OAuthFlowError> {
        let transport = ReqwestHttpTransport::with_options(config.timeout, MAX_RESPONSE_SIZE)?;
        Ok(Self::with_components(
            config,
            transport,
            InMemorySessionStore::new(),
        ))
    }

    /// Create a client from the process environment.
    pub fn from_env() -> Result<Self, OAuthFlowError> {
        Self::new(resolve()?)
    }
}

impl<T: HttpTransport, S: SessionStore> ZohoAdminAuth<T, S> {
    /// Create a client with custom implementations.
    pub fn with_components(config: OAuthConfiguration, transport: T, session_store: S) -> Self {
        Self::with_shared(
            config,
            Arc::new(transport),
            Arc::new(session_store),
            Arc::new(ExchangeGuard::new()),
            Arc::new(ErrorClassifier::default()),
        )
    }

    /// Create a client from shared components. Clients handed the same
    /// guard never exchange the same code twice.
    pub fn with_shared(
        config: OAuthConfiguration,
        transport: Arc<T>,
        session_store: Arc<S>,
        guard: Arc<ExchangeGuard>,
        classifier: Arc<ErrorClassifier>,
    ) -> Self {
        let processor = CallbackProcessor::with_guard(
            config.clone(),
            transport.clone(),
            session_store.clone(),
            guard,
            classifier,
        );
        Self {
            config,
            transport,
            session_store,
            processor,
        }
    }

    pub fn config(&self) -> &OAuthConfiguration {
        &self.config
    }

    pub fn session_store(&self) -> &Arc<S> {
        &self.session_store
    }

    /// URL to send the browser to in order to start the login.
    pub fn authorization_url(&self) -> Result<Url, ConfigurationError> {
        build_auth_url(&self.config)
    }

    /// Handle the provider redirect.
    pub async fn handle_callback(&self, params: &CallbackParameters) -> CallbackOutcome {
        self.processor.process_callback(params).await
    }

    /// Handle the provider redirect given the full callback URL.
    pub async fn handle_callback_url(&self, url: &Url) -> CallbackOutcome {
        self.processor.process_callback_url(url).await
    }

    pub fn callback_state(&self) -> CallbackState {
        self.processor.state()
    }

    /// The signed-in admin session, if any.
    pub async fn current_session(&self) -> Result<Option<SessionRecord>, OAuthFlowError> {
        active_admin_session(self.session_store.as_ref()).await
    }

    pub async fn is_authenticated(&self) -> Result<bool, OAuthFlowError> {
        Ok(self.current_session().await?.is_some())
    }

    /// Re-fetch the administrator profile and store it on the session.
    ///
    /// Returns the updated record, or `None` when nobody is signed in.
    pub async fn refresh_user_info(&self) -> Result<Option<SessionRecord>, OAuthFlowError> {
        let Some(mut record) = self.current_session().await? else {
            debug!("No active admin session to refresh");
            return Ok(None);
        };

        record.user_info =
            fetch_user_info(&self.config, self.transport.as_ref(), &record.access_token).await?;
        self.session_store.save(record.clone()).await?;
        Ok(Some(record))
    }

    /// Sign out. Returns whether a session existed.
    pub async fn logout(&self) -> Result<bool, OAuthFlowError> {
        self.session_store.clear().await
    }
}

/// Create a login client with default implementations.
pub fn zoho_admin_auth(config: OAuthConfiguration) -> Result<ZohoAdminAuth, OAuthFlowError> {
    ZohoAdminAuth::new(config)
}
