// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Resilient request dispatch
//!
//! Every API call goes through [`GmaClient::execute`]. A 200 is decoded, a
//! 404 is a normal "absent" result, anything else means the session is no
//! longer good: it is dropped and the call is retried with a fresh
//! handshake until the retry budget runs out.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::client::GmaClient;
use crate::error::{Error, Result};
use crate::http::{headers, Request, Response};

/// Request body of an API call
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    /// No body
    #[default]
    Empty,
    /// Already-serialized JSON, sent verbatim
    Raw(String),
    /// Structured value, serialized on send
    Json(Value),
}

impl Payload {
    /// Serialize any value into a JSON payload
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Payload::Json(serde_json::to_value(value)?))
    }

    /// Body bytes, or `None` when nothing is to be sent
    pub fn encode(&self) -> Result<Option<Bytes>> {
        match self {
            Payload::Empty | Payload::Json(Value::Null) => Ok(None),
            Payload::Raw(raw) => Ok(Some(Bytes::from(raw.clone()))),
            Payload::Json(value) => Ok(Some(Bytes::from(serde_json::to_vec(value)?))),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<String> for Payload {
    fn from(raw: String) -> Self {
        Payload::Raw(raw)
    }
}

impl From<&str> for Payload {
    fn from(raw: &str) -> Self {
        Payload::Raw(raw.to_string())
    }
}

/// A logical API call
#[derive(Debug, Clone)]
pub struct ApiCall {
    /// Path and query appended to the base URL, e.g. `?q=gmaservices/gma_node`
    pub endpoint: String,
    pub method: Method,
    pub payload: Payload,
    /// Overrides the client's retry budget for this call
    pub max_retries: Option<u32>,
    /// Overrides the transport timeout for each attempt
    pub timeout: Option<Duration>,
}

impl ApiCall {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            payload: Payload::Empty,
            max_retries: None,
            timeout: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>, payload: impl Into<Payload>) -> Self {
        Self::new(Method::POST, endpoint).payload(payload)
    }

    pub fn put(endpoint: impl Into<String>, payload: impl Into<Payload>) -> Self {
        Self::new(Method::PUT, endpoint).payload(payload)
    }

    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Result of an API call that did not exhaust its retries
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// 200 with its decoded body; an empty body decodes to `Null`
    Success(Value),
    /// 404, the resource does not exist
    Absent,
}

impl ApiResponse {
    pub fn is_absent(&self) -> bool {
        matches!(self, ApiResponse::Absent)
    }

    /// `Some(value)` for success, `None` for absent
    pub fn into_option(self) -> Option<Value> {
        match self {
            ApiResponse::Success(value) => Some(value),
            ApiResponse::Absent => None,
        }
    }
}

enum Outcome {
    Done(ApiResponse),
    Rejected(Option<u16>),
}

impl GmaClient {
    /// Execute an API call against the authenticated session
    ///
    /// Handshake failures and rejected calls are absorbed and retried. The
    /// only errors returned are a payload that cannot be encoded, an
    /// endpoint that does not form a URL, and
    /// [`Error::RetriesExhausted`], which is fatal.
    pub async fn execute(&mut self, call: ApiCall) -> Result<ApiResponse> {
        let body = call.payload.encode()?;
        let url = self.endpoint_url(&call.endpoint);
        let max_retries = call.max_retries.unwrap_or(self.config.retry.max_retries);
        let mut last_status = None;

        for attempt in 0..=max_retries {
            if attempt > 0 {
                let delay = self.config.retry.delay_for(attempt);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            if !self.state.is_authenticated() {
                // A failed handshake still lets the call go out; it will be
                // rejected and retried like any other invalid session.
                self.authenticate().await;
            }

            let mut request = self.build_request(&call.method, &url, body.clone())?;
            if let Some(timeout) = call.timeout {
                request = request.timeout(timeout);
            }
            let outcome = match self.transport.send(request).await {
                Ok(response) => classify(response),
                Err(e) => {
                    warn!(endpoint = %call.endpoint, attempt, error = %e, "API request failed");
                    Outcome::Rejected(None)
                }
            };

            match outcome {
                Outcome::Done(response) => {
                    if response.is_absent() {
                        debug!(endpoint = %call.endpoint, "API resource absent");
                    }
                    return Ok(response);
                }
                Outcome::Rejected(status) => {
                    last_status = status.or(last_status);
                    warn!(
                        endpoint = %call.endpoint,
                        attempt,
                        status = ?status,
                        "API request rejected, invalidating session"
                    );
                    self.state.invalidate();
                }
            }
        }

        let attempts = attempt_count(max_retries);
        error!(
            endpoint = %call.endpoint,
            attempts,
            last_status = ?last_status,
            "API retry budget exhausted"
        );
        Err(Error::RetriesExhausted {
            endpoint: call.endpoint,
            attempts,
            last_status,
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        let mut url = format!("{}{}", self.config.base_url, endpoint);
        if let Some(language) = self.state.language() {
            let separator = if url.contains('?') { '&' } else { '?' };
            url.push(separator);
            url.push_str("languageId=");
            url.push_str(language);
        }
        url
    }

    fn build_request(&self, method: &Method, url: &str, body: Option<Bytes>) -> Result<Request> {
        let mut request = Request::new(method.clone(), url)?.maybe_cookie(self.state.cookie());

        if let Some(token) = self.state.csrf_token() {
            request = request.header(headers::X_CSRF_TOKEN, token);
        }
        if let Some(body) = body {
            request = request.json_body(body);
        }

        Ok(request)
    }
}

/// First attempt plus every retry
fn attempt_count(max_retries: u32) -> u32 {
    max_retries.saturating_add(1)
}

fn classify(response: Response) -> Outcome {
    match response.status {
        StatusCode::OK => {
            if response.is_body_blank() {
                return Outcome::Done(ApiResponse::Success(Value::Null));
            }
            let value = response.json::<Value>().unwrap_or_else(|e| {
                warn!(error = %e, "API response is not JSON, treating as null");
                Value::Null
            });
            Outcome::Done(ApiResponse::Success(value))
        }
        StatusCode::NOT_FOUND => {
            Outcome::Done(ApiResponse::Absent)
        }
        status => Outcome::Rejected(Some(status.as_u16())),
    }
}
