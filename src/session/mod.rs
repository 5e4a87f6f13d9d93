// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Authenticated session handling
//!
//! [`Authenticator`] runs the CAS handshake and yields [`SessionTokens`].
//! The dispatcher owns the retry loop and is the only place
//! a [`SessionState`] is invalidated after a rejected call.

mod auth;
mod dispatch;

pub use auth::Authenticator;
pub use dispatch::{ApiCall, ApiResponse, Payload};

/// Tokens produced by one successful handshake
#[derive(Clone, PartialEq, Eq)]
pub struct SessionTokens {
    /// Session cookie as a `name=value` pair
    pub cookie: String,
    /// Anti-forgery token, when the service issued one
    pub csrf_token: Option<String>,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("cookie", &"<redacted>")
            .field("csrf_token", &self.csrf_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Session state held by a client
///
/// Starts empty, is populated as a whole from [`SessionTokens`] and is
/// cleared as a whole when a call is rejected or credentials change. The
/// language survives both.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    cookie: Option<String>,
    csrf_token: Option<String>,
    language: Option<String>,
}

impl SessionState {
    /// Create an empty state with the given language
    pub fn new(language: Option<String>) -> Self {
        Self {
            cookie: None,
            csrf_token: None,
            language,
        }
    }

    /// Install the tokens of a completed handshake
    pub fn establish(&mut self, tokens: SessionTokens) {
        self.cookie = Some(tokens.cookie);
        self.csrf_token = tokens.csrf_token;
    }

    /// Drop cookie and CSRF token
    pub fn invalidate(&mut self) {
        self.cookie = None;
        self.csrf_token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.cookie.as_deref().map_or(false, |c| !c.is_empty())
    }

    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn set_language(&mut self, language: Option<String>) {
        self.language = language;
    }
}
