// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer for the GMA client
//!
//! Request/response types, the [`Transport`] seam the session layer talks
//! through, and the header parser the handshake relies on.

mod header_parser;
mod request;
mod response;
mod transport;

pub use header_parser::{cookie_pair, HeaderSource};
pub use request::Request;
pub use response::Response;
pub use transport::{HttpTransport, Transport, TransportConfig};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("gma-client/", env!("CARGO_PKG_VERSION"));

/// Common HTTP headers
pub mod headers {
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const LOCATION: &str = "location";
    pub const SET_COOKIE: &str = "set-cookie";
    pub const SET_COOKIE2: &str = "set-cookie2";
    pub const X_CSRF_TOKEN: &str = "x-csrf-token";
}
