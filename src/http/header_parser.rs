// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Redirect target and session cookie extraction
//!
//! The handshake only ever needs two things from a response: where it
//! redirects to and which cookie it sets. Both are read through
//! [`HeaderSource`], so the authenticator works the same against a
//! structured [`HeaderMap`] or a raw dump of one or more header blocks.
//! When a header repeats, the last occurrence wins.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::HeaderMap;

use super::headers;
use super::response::Response;

lazy_static! {
    static ref LOCATION_LINE: Regex = Regex::new(r"(?im)^[ \t]*location[ \t]*:(.*)$").unwrap();
    static ref SET_COOKIE_LINE: Regex =
        Regex::new(r"(?im)^[ \t]*set-cookie2?[ \t]*:(.*)$").unwrap();
}

/// Something a redirect target and session cookie can be read from
pub trait HeaderSource {
    /// Last `Location` value, trimmed
    fn location(&self) -> Option<String>;

    /// `name=value` pair of the last `Set-Cookie`/`Set-Cookie2`, attributes dropped
    fn session_cookie(&self) -> Option<String>;
}

impl HeaderSource for str {
    fn location(&self) -> Option<String> {
        last_capture(&LOCATION_LINE, self)
    }

    fn session_cookie(&self) -> Option<String> {
        last_capture(&SET_COOKIE_LINE, self).and_then(|v| cookie_pair(&v))
    }
}

impl HeaderSource for HeaderMap {
    fn location(&self) -> Option<String> {
        last_value(self, &[headers::LOCATION])
    }

    fn session_cookie(&self) -> Option<String> {
        last_value(self, &[headers::SET_COOKIE, headers::SET_COOKIE2]).and_then(|v| cookie_pair(&v))
    }
}

impl HeaderSource for Response {
    fn location(&self) -> Option<String> {
        self.headers.location()
    }

    fn session_cookie(&self) -> Option<String> {
        self.headers.session_cookie()
    }
}

/// Strip cookie attributes, keeping the leading `name=value`
pub fn cookie_pair(set_cookie: &str) -> Option<String> {
    let pair = set_cookie.split(';').next().unwrap_or_default().trim();
    if pair.is_empty() {
        None
    } else {
        Some(pair.to_string())
    }
}

fn last_capture(pattern: &Regex, raw: &str) -> Option<String> {
    pattern
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|v| !v.is_empty())
        .last()
        .map(str::to_string)
}

fn last_value(map: &HeaderMap, names: &[&str]) -> Option<String> {
    // Set-Cookie and Set-Cookie2 are stored under separate keys, so the
    // most recent one can only be picked within a single name.
    names
        .iter()
        .filter_map(|name| {
            map.get_all(*name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .last()
        })
        .last()
        .map(str::to_string)
}
