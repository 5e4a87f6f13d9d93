// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scripted transport shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;

use gma_client::{ClientConfig, Error, GmaClient, Request, Response, RetryPolicy, Transport};

pub const BASE_URL: &str = "https://gma.example.org/index.php";
pub const CAS_URL: &str = "https://thekey.me/cas/";
pub const TICKETS_URL: &str = "https://thekey.me/cas/v1/tickets";
pub const TGT_URL: &str = "https://thekey.me/cas/v1/tickets/TGT-1-abc";
pub const SERVICE_URL: &str = "https://gma.example.org/index.php?q=en/gmaservices&destination=home";
pub const SESSION_COOKIE: &str = "SESSreal=live";
pub const PRE_COOKIE: &str = "SESSpre=pre";

/// One canned reply
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
    /// Fail at the transport level instead of answering
    pub unreachable: bool,
}

impl Reply {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
            unreachable: false,
        }
    }

    /// Connection failure, no response at all
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::status(200)
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    fn into_response(self, request: &Request) -> Response {
        let mut headers = HeaderMap::new();
        for (name, value) in self.headers {
            headers.append(
                HeaderName::from_static(name),
                HeaderValue::from_str(&value).unwrap(),
            );
        }
        Response::new(
            StatusCode::from_u16(self.status).unwrap(),
            headers,
            Bytes::from(self.body),
            request.url.clone(),
            0,
        )
    }
}

/// Transport that answers from a fixed script and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }

    /// Requests whose URL starts with the given prefix
    pub fn requests_to(&self, prefix: &str) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.as_str().starts_with(prefix))
            .collect()
    }

    /// Number of credential logins, i.e. handshakes started past the probe
    pub fn logins(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.url.as_str() == TICKETS_URL)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: Request) -> gma_client::Result<Response> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::other(format!("no scripted reply for {}", request.url)))?;
        if reply.unreachable {
            return Err(Error::other("connection refused"));
        }
        Ok(reply.into_response(&request))
    }
}

/// Probe, TGT, ST, callback, redirect and CSRF replies of a healthy handshake
pub fn probe_handshake() -> Vec<Reply> {
    vec![
        Reply::status(302)
            .header(
                "location",
                "https://thekey.me/cas/login?service=https%3A%2F%2Fgma.example.org%2Findex.php%3Fq%3Den%2Fgmaservices%26destination%3Dhome",
            )
            .header("set-cookie", format!("{}; path=/; HttpOnly", PRE_COOKIE)),
        Reply::status(201).header("location", TGT_URL),
        Reply::status(200).body("ST-1-xyz"),
        Reply::status(302)
            .header("location", "https://gma.example.org/index.php?q=en/node")
            .header("set-cookie", "SESSpre=stale; path=/"),
        Reply::status(200).header("set-cookie", format!("{}; path=/; HttpOnly", SESSION_COOKIE)),
        Reply::status(200).body("csrf-token-1\n"),
    ]
}

/// TGT, ST and a callback that sets the session directly
pub fn fixed_handshake() -> Vec<Reply> {
    vec![
        Reply::status(201).header("location", TGT_URL),
        Reply::status(200).body("ST-1-xyz"),
        Reply::status(200).header("set-cookie", format!("{}; path=/", SESSION_COOKIE)),
    ]
}

pub fn probe_config() -> ClientConfig {
    ClientConfig::new(BASE_URL)
        .cas_url(CAS_URL)
        .credentials("staff@example.org", "s3cret&pw")
        .retry(RetryPolicy::immediate(3))
}

pub fn fixed_config() -> ClientConfig {
    probe_config().fixed_service(SERVICE_URL).without_csrf()
}

pub fn scripted_client(config: ClientConfig, transport: &Arc<ScriptedTransport>) -> GmaClient {
    GmaClient::with_transport(config, transport.clone())
}
