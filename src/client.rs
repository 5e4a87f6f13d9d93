// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! GMA client
//!
//! One client holds one session. Calls take `&mut self`; share a client
//! across tasks behind a mutex, or give each worker its own.

use std::sync::Arc;

use tracing::warn;

use crate::config::{ClientConfig, Credentials};
use crate::error::Result;
use crate::http::{HttpTransport, Transport};
use crate::session::{Authenticator, SessionState, SessionTokens};

/// CAS-authenticated client for the GMA API
pub struct GmaClient {
    pub(crate) config: ClientConfig,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) state: SessionState,
}

impl GmaClient {
    /// Create a client backed by the reqwest transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::with_config(config.transport.clone())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over any transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let state = SessionState::new(config.language.clone());
        Self {
            config,
            transport,
            state,
        }
    }

    /// Get client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run the handshake now, replacing any current session
    ///
    /// Returns whether a session was established. A failure leaves the
    /// client unauthenticated; it is not an error.
    pub async fn authenticate(&mut self) -> bool {
        self.state.invalidate();

        let outcome = Authenticator::new(&self.config, self.transport.as_ref())
            .establish()
            .await;

        match outcome {
            Ok(tokens) => {
                self.state.establish(tokens);
                true
            }
            Err(e) => {
                warn!(
                    error = %e,
                    step = ?e.handshake_step(),
                    status = ?e.status_code(),
                    "CAS handshake failed"
                );
                false
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn session_cookie(&self) -> Option<&str> {
        self.state.cookie()
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.state.csrf_token()
    }

    pub fn language(&self) -> Option<&str> {
        self.state.language()
    }

    /// Reuse a session captured earlier, e.g. from another client
    pub fn resume(&mut self, cookie: impl Into<String>, csrf_token: Option<String>) {
        self.state.establish(SessionTokens {
            cookie: cookie.into(),
            csrf_token,
        });
    }

    /// Drop the current session; the next call re-authenticates
    pub fn invalidate(&mut self) {
        self.state.invalidate();
    }

    /// Change the language; the session is kept
    pub fn set_language(&mut self, language: Option<String>) {
        self.config.language = language.clone();
        self.state.set_language(language);
    }

    pub fn set_cas_url(&mut self, cas_url: impl Into<String>) {
        self.state.invalidate();
        self.config = std::mem::take(&mut self.config).cas_url(cas_url);
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.state.invalidate();
        self.config.credentials.username = username.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.state.invalidate();
        self.config.credentials.password = password.into();
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.state.invalidate();
        self.config.credentials = credentials;
    }
}

impl std::fmt::Debug for GmaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmaClient")
            .field("base_url", &self.config.base_url)
            .field("authenticated", &self.state.is_authenticated())
            .finish()
    }
}
