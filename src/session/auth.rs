// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CAS ticket handshake
//!
//! 1. probe the service for its callback URL and a pre-session cookie
//!    (skipped when the callback is fixed)
//! 2. POST credentials to `{cas}v1/tickets`, expect 201 + TGT `Location`
//! 3. POST `service=` to the TGT, expect 200 + service ticket body
//! 4. GET `{service}&ticket={ST}`, then follow its one redirect; the cookie
//!    set by that second hop is the session cookie
//! 5. optionally fetch a CSRF token with the new cookie
//!
//! Each step feeds the next. Nothing is published unless all of them succeed.

use reqwest::StatusCode;
use tracing::{debug, info};
use url::Url;

use super::SessionTokens;
use crate::config::{ClientConfig, ServiceDiscovery};
use crate::error::{Error, HandshakeStep, Result};
use crate::http::{HeaderSource, Request, Response, Transport};

/// Outcome of the initial unauthenticated probe
#[derive(Debug)]
struct Probe {
    service: String,
    pre_cookie: String,
}

/// Runs one authentication attempt against CAS
pub struct Authenticator<'a> {
    config: &'a ClientConfig,
    transport: &'a dyn Transport,
}

impl<'a> Authenticator<'a> {
    pub fn new(config: &'a ClientConfig, transport: &'a dyn Transport) -> Self {
        Self { config, transport }
    }

    /// Run the full handshake
    pub async fn establish(&self) -> Result<SessionTokens> {
        let (service, pre_cookie) = match self.config.service_discovery {
            ServiceDiscovery::Probe => {
                let probe = self.probe().await?;
                (probe.service, Some(probe.pre_cookie))
            }
            ServiceDiscovery::Fixed(ref service) => (service.clone(), None),
        };

        let tgt_url = self.request_ticket_granting_ticket().await?;
        let ticket = self.request_service_ticket(&tgt_url, &service).await?;
        let cookie = self
            .redeem_service_ticket(&service, &ticket, pre_cookie.as_deref())
            .await?;

        let csrf_token = match self.config.csrf_endpoint {
            Some(ref endpoint) => self.fetch_csrf_token(endpoint, &cookie).await,
            None => None,
        };

        info!(
            service = %service,
            csrf = csrf_token.is_some(),
            "GMA session established"
        );

        Ok(SessionTokens { cookie, csrf_token })
    }

    async fn probe(&self) -> Result<Probe> {
        let response = self
            .send(HandshakeStep::Probe, Request::get(&self.config.base_url)?)
            .await?;
        debug!(step = %HandshakeStep::Probe, status = response.status_code(), "probe response");

        let login_url = response
            .location()
            .ok_or_else(|| Error::auth(HandshakeStep::Probe, "no redirect to the CAS login"))?;
        let login_url = resolve(&response.url, &login_url)?;

        let service = login_url
            .query_pairs()
            .find(|(key, _)| key == "service")
            .map(|(_, value)| value.into_owned())
            .filter(|service| !service.is_empty())
            .ok_or_else(|| Error::auth(HandshakeStep::Probe, "login redirect has no service parameter"))?;

        let pre_cookie = response
            .session_cookie()
            .ok_or_else(|| Error::auth(HandshakeStep::Probe, "no pre-session cookie"))?;

        Ok(Probe { service, pre_cookie })
    }

    async fn request_ticket_granting_ticket(&self) -> Result<Url> {
        let step = HandshakeStep::TicketGranting;
        let credentials = &self.config.credentials;

        let request = Request::post(self.config.tickets_url())?.form(&[
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ]);
        let response = self.send(step, request).await?;
        debug!(step = %step, status = response.status_code(), "ticket endpoint response");

        if response.status != StatusCode::CREATED {
            return Err(Error::auth_status(
                step,
                response.status_code(),
                "CAS did not issue a ticket-granting ticket",
            ));
        }

        let tgt = response
            .location()
            .ok_or_else(|| Error::auth(step, "ticket-granting ticket location missing"))?;
        resolve(&response.url, &tgt)
    }

    async fn request_service_ticket(&self, tgt_url: &Url, service: &str) -> Result<String> {
        let step = HandshakeStep::ServiceTicket;

        let request = Request::post(tgt_url.as_str())?.form(&[("service", service)]);
        let response = self.send(step, request).await?;
        debug!(step = %step, status = response.status_code(), "ticket-granting ticket response");

        if response.status != StatusCode::OK {
            return Err(Error::auth_status(
                step,
                response.status_code(),
                "CAS did not issue a service ticket",
            ));
        }
        if response.is_body_blank() {
            return Err(Error::auth(step, "service ticket is empty"));
        }

        Ok(response.text_lossy())
    }

    async fn redeem_service_ticket(
        &self,
        service: &str,
        ticket: &str,
        pre_cookie: Option<&str>,
    ) -> Result<String> {
        let separator = if service.contains('?') { '&' } else { '?' };
        let callback = format!("{}{}ticket={}", service, separator, ticket);

        let response = self
            .send(
                HandshakeStep::ServiceCallback,
                Request::get(&callback)?.maybe_cookie(pre_cookie),
            )
            .await?;
        debug!(
            step = %HandshakeStep::ServiceCallback,
            status = response.status_code(),
            "service callback response"
        );

        let callback_cookie = response.session_cookie();
        let Some(next) = response.location() else {
            // No second hop: the callback itself set the session.
            return callback_cookie.ok_or_else(|| {
                Error::auth(HandshakeStep::ServiceCallback, "service callback set no cookie")
            });
        };

        let step = HandshakeStep::SessionRedirect;
        let next = resolve(&response.url, &next)?;
        let hop_cookie = pre_cookie.or(callback_cookie.as_deref());
        let response = self
            .send(step, Request::get(next.as_str())?.maybe_cookie(hop_cookie))
            .await?;
        debug!(step = %step, status = response.status_code(), "session redirect response");

        response
            .session_cookie()
            .ok_or_else(|| Error::auth(step, "session cookie missing after redirect"))
    }

    /// Send one handshake hop, attributing transport failures to the step
    async fn send(&self, step: HandshakeStep, request: Request) -> Result<Response> {
        self.transport
            .send(request)
            .await
            .map_err(|e| Error::auth(step, format!("request failed: {}", e)))
    }

    /// A missing token is not fatal; a service that needs one rejects the
    /// next call and the dispatcher re-authenticates.
    async fn fetch_csrf_token(&self, endpoint: &str, cookie: &str) -> Option<String> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        let request = match Request::get(&url) {
            Ok(request) => request.cookie(cookie),
            Err(e) => {
                debug!(error = %e, "CSRF endpoint is not a valid URL");
                return None;
            }
        };

        match self.transport.send(request).await {
            Ok(response) if response.status == StatusCode::OK => {
                let token = response.text_lossy().trim().to_string();
                (!token.is_empty()).then_some(token)
            }
            Ok(response) => {
                debug!(status = response.status_code(), "no CSRF token issued");
                None
            }
            Err(e) => {
                debug!(error = %e, "CSRF token fetch failed");
                None
            }
        }
    }
}

/// Resolve a `Location` value against the URL it was served from
fn resolve(base: &Url, location: &str) -> Result<Url> {
    Ok(base.join(location)?)
}
