// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the GMA client
//!
//! Handshake failures and invalid API responses are absorbed by the
//! dispatcher. The only error a facade caller is expected to see is
//! [`Error::RetriesExhausted`], which is fatal.

use std::fmt;

use thiserror::Error;

/// Result type alias for GMA client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Steps of the CAS ticket handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStep {
    /// Unauthenticated probe of the service URL
    Probe,
    /// Credential login against the CAS ticket endpoint
    TicketGranting,
    /// Minting a service ticket from the TGT
    ServiceTicket,
    /// Redeeming the service ticket at the service callback
    ServiceCallback,
    /// Following the callback redirect to capture the session cookie
    SessionRedirect,
}

impl fmt::Display for HandshakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandshakeStep::Probe => "probe",
            HandshakeStep::TicketGranting => "ticket-granting",
            HandshakeStep::ServiceTicket => "service-ticket",
            HandshakeStep::ServiceCallback => "service-callback",
            HandshakeStep::SessionRedirect => "session-redirect",
        };
        f.write_str(name)
    }
}

/// Main error type for the GMA client
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A handshake step did not produce what the next step needs
    #[error("Authentication failed at {step}: {reason}")]
    Authentication {
        step: HandshakeStep,
        reason: String,
        status: Option<u16>,
    },

    /// Every attempt of an API call was rejected
    #[error("API request to {endpoint} failed after {attempts} attempts (last status: {last_status:?})")]
    RetriesExhausted {
        endpoint: String,
        attempts: u32,
        last_status: Option<u16>,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an authentication error for a handshake step
    pub fn auth(step: HandshakeStep, reason: impl Into<String>) -> Self {
        Error::Authentication {
            step,
            reason: reason.into(),
            status: None,
        }
    }

    /// Create an authentication error carrying the offending status
    pub fn auth_status(step: HandshakeStep, status: u16, reason: impl Into<String>) -> Self {
        Error::Authentication {
            step,
            reason: reason.into(),
            status: Some(status),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Retry exhaustion is unrecoverable and must not be treated as a failed call
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::RetriesExhausted { .. })
    }

    /// Handshake step that failed, if this is an authentication error
    pub fn handshake_step(&self) -> Option<HandshakeStep> {
        match self {
            Error::Authentication { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Authentication { status, .. } => *status,
            Error::RetriesExhausted { last_status, .. } => *last_status,
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
