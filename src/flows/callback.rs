//! Callback Processing
//!
//! Consumes the provider redirect once, exchanges the authorization code
//! through the backend, and persists the admin session.

use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use url::Url;

use crate::core::{
    DomainSuffix, ExchangeGuard, HttpMethod, HttpRequest, HttpTransport, SkipReason,
};
use crate::error::{
    is_technical, sanitize, ErrorClassifier, ErrorInfo, ExchangeError, OAuthFlowError,
    ProviderError,
};
use crate::session::SessionStore;
use crate::types::{
    BackendExchangeRequest, BackendExchangeResponse, CallbackParameters, OAuthConfiguration,
    SessionRecord, UserInfo, EXCHANGE_SOURCE,
};

/// Callback processing state. `Success` and `Error` are terminal.
#[derive(Clone, Debug, PartialEq)]
pub enum CallbackState {
    Idle,
    Loading,
    Success { redirect_to: String },
    Error(ErrorInfo),
}

/// Result of a single `process_callback` call.
#[derive(Clone, Debug)]
pub enum CallbackOutcome {
    /// Nothing was done and the state is unchanged.
    Skipped(SkipReason),
    /// Session persisted; the caller should navigate to `redirect_to`.
    Success {
        session: SessionRecord,
        redirect_to: String,
    },
    /// Login failed. `details` is only present for technical failures.
    Failed {
        error: ErrorInfo,
        error_code: &'static str,
        retryable: bool,
        details: Option<String>,
    },
}

impl CallbackOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// The classified error, if the login failed.
    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Callback processor.
///
/// Processors that serve the same user session must share one
/// [`ExchangeGuard`] so a code is never exchanged twice.
pub struct CallbackProcessor<T: HttpTransport, S: SessionStore> {
    config: OAuthConfiguration,
    transport: Arc<T>,
    session_store: Arc<S>,
    guard: Arc<ExchangeGuard>,
    classifier: Arc<ErrorClassifier>,
    state: Mutex<CallbackState>,
}

impl<T: HttpTransport, S: SessionStore> CallbackProcessor<T, S> {
    /// Create a processor with its own guard and the built-in error rules.
    pub fn new(config: OAuthConfiguration, transport: Arc<T>, session_store: Arc<S>) -> Self {
        Self::with_guard(
            config,
            transport,
            session_store,
            Arc::new(ExchangeGuard::new()),
            Arc::new(ErrorClassifier::default()),
        )
    }

    pub fn with_guard(
        config: OAuthConfiguration,
        transport: Arc<T>,
        session_store: Arc<S>,
        guard: Arc<ExchangeGuard>,
        classifier: Arc<ErrorClassifier>,
    ) -> Self {
        Self {
            config,
            transport,
            session_store,
            guard,
            classifier,
            state: Mutex::new(CallbackState::Idle),
        }
    }

    /// Current state.
    pub fn state(&self) -> CallbackState {
        self.lock_state().clone()
    }

    pub fn guard(&self) -> &Arc<ExchangeGuard> {
        &self.guard
    }

    fn lock_state(&self) -> MutexGuard<'_, CallbackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: CallbackState) {
        *self.lock_state() = state;
    }

    /// Process the callback URL the provider redirected to.
    pub async fn process_callback_url(&self, url: &Url) -> CallbackOutcome {
        self.process_callback(&CallbackParameters::from_url(url)).await
    }

    /// Process callback parameters.
    ///
    /// A callback with neither a code nor an error, or whose code was
    /// already claimed, is skipped without any state change or network call.
    pub async fn process_callback(&self, params: &CallbackParameters) -> CallbackOutcome {
        let Some(code) = params.code.as_deref() else {
            if let Some(error) = params.error.as_deref() {
                let error = ProviderError::new(error, params.error_description.clone());
                return self.fail(error.into());
            }
            debug!("Callback has no authorization code, nothing to do");
            return CallbackOutcome::Skipped(SkipReason::NoCode);
        };

        let key = match self.guard.try_begin(code) {
            Ok(key) => key,
            Err(reason) => {
                debug!(?reason, "Skipping callback");
                return CallbackOutcome::Skipped(reason);
            }
        };

        self.set_state(CallbackState::Loading);

        if let Some(error) = params.error.as_deref() {
            self.guard.abandon(&key);
            let error = ProviderError::new(error, params.error_description.clone());
            return self.fail(error.into());
        }

        let domain = DomainSuffix::from_callback(params);
        debug!(domain_suffix = %domain, "Resolved data center");

        let session = match self.exchange(code, params, &domain).await {
            Ok(session) => session,
            Err(error) => {
                self.guard.abandon(&key);
                return self.fail(error);
            }
        };

        if let Err(error) = self.session_store.save(session.clone()).await {
            self.guard.abandon(&key);
            return self.fail(error);
        }

        self.guard.complete(&key);
        let redirect_to = self.config.dashboard_url();
        info!(
            user_id = session.user_info.id.as_deref().unwrap_or(""),
            domain_suffix = %domain,
            "Admin login completed"
        );
        self.set_state(CallbackState::Success {
            redirect_to: redirect_to.clone(),
        });

        CallbackOutcome::Success {
            session,
            redirect_to,
        }
    }

    /// Exchange the code through the backend and build the session record.
    async fn exchange(
        &self,
        code: &str,
        params: &CallbackParameters,
        domain: &DomainSuffix,
    ) -> Result<SessionRecord, OAuthFlowError> {
        let request = BackendExchangeRequest {
            code: code.to_string(),
            client_id: self.config.client_id.clone(),
            client_secret: self.config.client_secret.expose_secret().clone(),
            redirect_uri: self.config.redirect_url.clone(),
            grant_type: "authorization_code",
            location: params.location.clone(),
            accounts_server: params.accounts_server.clone(),
            domain_suffix: domain.as_str().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            user_agent: self.config.user_agent.clone(),
            source: EXCHANGE_SOURCE,
        };

        let body = serde_json::to_string(&request)
            .map_err(|e| OAuthFlowError::unknown(format!("Failed to encode exchange request: {}", e)))?;

        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        headers.insert("accept".to_string(), "application/json".to_string());
        headers.insert("user-agent".to_string(), self.config.user_agent.clone());

        let http_request = HttpRequest {
            method: HttpMethod::Post,
            url: self.config.backend_token_endpoint.clone(),
            headers,
            body: Some(body),
            timeout: Some(self.config.timeout),
        };

        debug!(endpoint = %http_request.url, "Exchanging authorization code");
        let response = self.transport.send(http_request).await?;

        if !response.is_success() {
            return Err(ExchangeError::BackendStatus {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        let payload: BackendExchangeResponse =
            serde_json::from_str(&response.body).map_err(|e| ExchangeError::InvalidResponse {
                message: e.to_string(),
            })?;

        if !payload.success {
            return Err(ExchangeError::Rejected {
                message: payload.failure_message(),
            }
            .into());
        }

        let access_token = payload
            .access_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(ExchangeError::MissingAccessToken)?
            .to_string();

        let user_info = match payload.decode_user_info() {
            Some(Ok(user_info)) => user_info,
            Some(Err(e)) => {
                warn!(error = %e, "Backend user info is malformed, using placeholder administrator");
                UserInfo::placeholder_admin()
            }
            None => {
                warn!("Backend returned no user info, using placeholder administrator");
                UserInfo::placeholder_admin()
            }
        };

        Ok(SessionRecord::admin(
            access_token,
            payload.refresh_token,
            payload.expires_in,
            user_info,
            domain.as_str(),
        ))
    }

    fn fail(&self, error: OAuthFlowError) -> CallbackOutcome {
        let raw = error.to_string();
        let info = self.classifier.classify_flow_error(&error);

        let details = is_technical(&raw).then(|| {
            let cleaned = sanitize(&raw);
            if cleaned.is_empty() {
                raw.clone()
            } else {
                cleaned
            }
        });

        if let OAuthFlowError::Provider(ProviderError {
            description: Some(description),
            ..
        }) = &error
        {
            warn!(description = %description, "Provider returned an error description");
        }
        warn!(
            error_code = error.error_code(),
            title = %info.title,
            error = %raw,
            "Admin login failed"
        );

        self.set_state(CallbackState::Error(info.clone()));

        CallbackOutcome::Failed {
            error: info,
            error_code: error.error_code(),
            retryable: error.is_retryable(),
            details,
        }
    }
}
