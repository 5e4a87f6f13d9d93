// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # gma-client - CAS-authenticated GMA API client
//!
//! Signs in to a GMA service through the CAS REST ticket protocol and
//! dispatches JSON API calls against the resulting cookie session. Expired
//! or rejected sessions are re-established transparently, up to a bounded
//! number of retries.
//!
//! ## Features
//!
//! - Full CAS handshake: service probe, TGT, service ticket, cookie capture
//! - Fixed-callback variant for services without a probe redirect
//! - Optional in-session CSRF token, sent as `X-CSRF-Token`
//! - 404 is an explicit absent result, not an error
//! - Bounded retries with linear backoff; exhaustion is a distinct fatal error
//! - Pluggable transport for testing
//!
//! ## Example
//!
//! ```rust,no_run
//! use gma_client::{ClientConfig, GmaClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("https://gma.example.org/index.php")
//!         .credentials("staff@example.org", "secret");
//!     let mut client = GmaClient::new(config)?;
//!
//!     match client.get_node(42).await? {
//!         Some(node) => println!("{}", node),
//!         None => println!("node 42 does not exist"),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod session;

// Client
pub use client::GmaClient;

// Configuration
pub use config::{ClientConfig, Credentials, RetryPolicy, ServiceDiscovery};

// Endpoints
pub use endpoints::{Measurement, MeasurementType, ReportScope, StaffReportQuery};

// Errors
pub use error::{Error, HandshakeStep, Result};

// HTTP
pub use http::{HeaderSource, HttpTransport, Request, Response, Transport, TransportConfig};

// Session
pub use session::{ApiCall, ApiResponse, Authenticator, Payload, SessionState, SessionTokens};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
