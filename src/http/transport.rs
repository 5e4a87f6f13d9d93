// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP transport implementation

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::trace;
use url::Url;

use super::request::Request;
use super::response::Response;
use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};

/// Anything that can carry a [`Request`] to a server and bring back a [`Response`]
///
/// The session layer never talks to reqwest directly, so tests can script
/// whole handshakes without a network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the raw response, whatever its status
    async fn send(&self, request: Request) -> Result<Response>;
}

/// Transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// User agent string
    pub user_agent: String,
    /// Default timeout
    pub timeout: Duration,
    /// Maximum redirects to follow when a request asks for it
    pub max_redirects: usize,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Default headers
    pub default_headers: HeaderMap,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            "accept",
            HeaderValue::from_static("application/json, text/plain;q=0.9, */*;q=0.8"),
        );

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            accept_invalid_certs: false,
            default_headers,
            proxy: None,
        }
    }
}

/// reqwest-backed transport
///
/// Holds two clients because reqwest fixes the redirect policy per client:
/// `direct` never follows redirects, `following` does.
#[derive(Clone)]
pub struct HttpTransport {
    direct: Client,
    following: Client,
    config: TransportConfig,
}

impl HttpTransport {
    /// Create a new transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(TransportConfig::default())
    }

    /// Create a new transport with custom configuration
    pub fn with_config(config: TransportConfig) -> Result<Self> {
        let direct = Self::build_client(&config, Policy::none())?;
        let following = Self::build_client(&config, Policy::limited(config.max_redirects))?;

        Ok(Self {
            direct,
            following,
            config,
        })
    }

    fn build_client(config: &TransportConfig, policy: Policy) -> Result<Client> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(policy)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(config.default_headers.clone());

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        Ok(builder.build()?)
    }

    /// Get transport configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let start = Instant::now();

        let client = if request.follow_redirects {
            &self.following
        } else {
            &self.direct
        };

        let mut builder = client.request(request.method.clone(), request.url.clone());

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        // Handshake URLs carry service tickets; keep them out of error text.
        let response = builder.send().await.map_err(|e| Error::Http(e.without_url()))?;
        let response_time = start.elapsed().as_millis() as u64;

        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;

        trace!(
            method = %request.method,
            origin = %origin(&request.url),
            status = status.as_u16(),
            elapsed_ms = response_time,
            "transport round trip"
        );

        Ok(Response::new(status, headers, body, final_url, response_time))
    }
}

/// Scheme and authority only; ticket URLs carry secrets in the path and query
fn origin(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}://{}:{}", url.scheme(), host, port),
        (Some(host), None) => format!("{}://{}", url.scheme(), host),
        _ => url.scheme().to_string(),
    }
}
