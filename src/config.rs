// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Client configuration

use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::http::TransportConfig;

/// Public CAS server used when no other is configured
pub const DEFAULT_CAS_URL: &str = "https://thekey.me/cas/";

/// Endpoint that hands out the in-session CSRF token
pub const DEFAULT_CSRF_ENDPOINT: &str = "?q=services/session/token";

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// CAS login credentials
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How the handshake learns the service URL CAS must redirect back to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServiceDiscovery {
    /// Probe the base URL and read `service` from the CAS login redirect.
    /// Also captures the pre-session cookie.
    #[default]
    Probe,
    /// The service exposes a fixed callback URL
    Fixed(String),
}

/// Retry budget and spacing for API calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Linear backoff unit; retry `n` waits `backoff * n`
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Retry without any delay between attempts
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before the given retry (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(retry)
    }
}

/// GMA client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base service URL, endpoints are appended verbatim
    pub base_url: String,
    /// CAS base URL, ending in `/`
    pub cas_url: String,
    /// CAS login credentials
    pub credentials: Credentials,
    /// Active language id, sent as `languageId`
    pub language: Option<String>,
    /// Handshake variant
    pub service_discovery: ServiceDiscovery,
    /// CSRF token endpoint; `None` disables the token fetch
    pub csrf_endpoint: Option<String>,
    /// Retry policy for API calls
    pub retry: RetryPolicy,
    /// Transport options
    pub transport: TransportConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            cas_url: DEFAULT_CAS_URL.to_string(),
            credentials: Credentials::default(),
            language: None,
            service_discovery: ServiceDiscovery::default(),
            csrf_endpoint: Some(DEFAULT_CSRF_ENDPOINT.to_string()),
            retry: RetryPolicy::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a config for the given service URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set CAS base URL
    pub fn cas_url(mut self, cas_url: impl Into<String>) -> Self {
        self.cas_url = with_trailing_slash(cas_url.into());
        self
    }

    /// Set credentials
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Credentials::new(username, password);
        self
    }

    /// Set language id
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Use a fixed service callback instead of probing for it
    pub fn fixed_service(mut self, service_url: impl Into<String>) -> Self {
        self.service_discovery = ServiceDiscovery::Fixed(service_url.into());
        self
    }

    /// Set the CSRF token endpoint
    pub fn csrf_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.csrf_endpoint = Some(endpoint.into());
        self
    }

    /// Skip fetching a CSRF token
    pub fn without_csrf(mut self) -> Self {
        self.csrf_endpoint = None;
        self
    }

    /// Set retry policy
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.transport.user_agent = user_agent.into();
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.transport.proxy = Some(proxy.into());
        self
    }

    /// Accept invalid TLS certificates
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.transport.accept_invalid_certs = accept;
        self
    }

    /// URL of the CAS ticket endpoint
    pub fn tickets_url(&self) -> String {
        format!("{}v1/tickets", with_trailing_slash(self.cas_url.clone()))
    }

    /// Check that every URL the client will build from parses
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::config("base URL is not set"));
        }
        Url::parse(&self.base_url)
            .map_err(|e| Error::config(format!("invalid base URL '{}': {}", self.base_url, e)))?;
        Url::parse(&self.cas_url)
            .map_err(|e| Error::config(format!("invalid CAS URL '{}': {}", self.cas_url, e)))?;
        if let ServiceDiscovery::Fixed(ref service) = self.service_discovery {
            Url::parse(service)
                .map_err(|e| Error::config(format!("invalid service URL '{}': {}", service, e)))?;
        }
        Ok(())
    }

    /// Load configuration from `GMA_*` / `CAS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::config(format!("{} is not set", key)))
        };

        let mut config = ClientConfig::new(required("GMA_URL")?)
            .credentials(required("CAS_USERNAME")?, required("CAS_PASSWORD")?);

        if let Some(cas_url) = lookup("CAS_URL").filter(|v| !v.is_empty()) {
            config = config.cas_url(cas_url);
        }
        if let Some(language) = lookup("GMA_LANGUAGE").filter(|v| !v.is_empty()) {
            config = config.language(language);
        }
        if let Some(service) = lookup("GMA_SERVICE_URL").filter(|v| !v.is_empty()) {
            config = config.fixed_service(service);
        }
        if let Some(csrf) = lookup("GMA_CSRF") {
            if matches!(csrf.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off") {
                config = config.without_csrf();
            }
        }
        if let Some(retries) = lookup("GMA_MAX_RETRIES") {
            config.retry.max_retries = retries
                .parse()
                .map_err(|_| Error::config(format!("GMA_MAX_RETRIES is not a number: {}", retries)))?;
        }
        if let Some(secs) = lookup("GMA_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| Error::config(format!("GMA_TIMEOUT_SECS is not a number: {}", secs)))?;
            config = config.timeout(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
