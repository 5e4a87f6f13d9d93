// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! gma CLI - query the GMA API from the command line
//!
//! Connection settings come from the environment, see
//! [`ClientConfig::from_env`].

use std::env;
use std::process::ExitCode;

use anyhow::{bail, Context};
use reqwest::Method;
use serde_json::Value;

use gma_client::{ApiCall, ClientConfig, Error, GmaClient, Payload, StaffReportQuery};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gma_client=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    let Some(command) = args.first() else {
        print_usage();
        return ExitCode::from(1);
    };

    match command.as_str() {
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("gma {}", gma_client::VERSION);
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    match run(command, &args[1..]).await {
        Ok(value) => {
            let rendered = match value {
                Some(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
                None => "null".to_string(),
            };
            println!("{}", rendered);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<Error>() {
                Some(err) if err.is_fatal() => ExitCode::from(2),
                _ => ExitCode::from(1),
            }
        }
    }
}

async fn run(command: &str, args: &[String]) -> anyhow::Result<Option<Value>> {
    let config = ClientConfig::from_env().context("loading configuration")?;
    let mut client = GmaClient::new(config)?;

    let value = match command {
        "languages" => client.get_languages().await?,
        "nodes" => client.get_nodes().await?,
        "node" => client.get_node(id_arg(args)?).await?,
        "measurements" => client.get_node_measurements(id_arg(args)?).await?,
        "parent" => client.get_node_parent(id_arg(args)?).await?,
        "users" => client.get_users(args.first().map(String::as_str)).await?,
        "report" => client.get_staff_report_measurements(id_arg(args)?).await?,
        "reports" => {
            let query = match args.first().map(String::as_str) {
                None | Some("own") => StaffReportQuery::own(),
                Some("all") => StaffReportQuery::all(),
                Some(other) => bail!("unknown report scope '{}', expected own or all", other),
            };
            client.get_staff_reports(&query).await?
        }
        "request" => {
            let Some(endpoint) = args.first() else {
                bail!("Usage: gma request <endpoint> [METHOD] [json]");
            };
            let method = match args.get(1) {
                Some(m) => Method::from_bytes(m.to_uppercase().as_bytes())
                    .with_context(|| format!("invalid method '{}'", m))?,
                None => Method::GET,
            };
            let payload = args.get(2).map_or(Payload::Empty, |raw| Payload::from(raw.as_str()));
            client
                .execute(ApiCall::new(method, endpoint.as_str()).payload(payload))
                .await?
                .into_option()
        }
        other => {
            print_usage();
            bail!("unknown command '{}'", other);
        }
    };

    Ok(value)
}

fn id_arg(args: &[String]) -> anyhow::Result<i64> {
    let raw = args.first().context("missing <id> argument")?;
    raw.parse().with_context(|| format!("'{}' is not a numeric id", raw))
}

fn print_usage() {
    println!(
        r#"gma - GMA API client with CAS sign-on

USAGE:
    gma <COMMAND> [ARGS]

COMMANDS:
    languages                       List languages
    nodes                           List nodes
    node <id>                       Show a node
    measurements <id>               List a node's measurements
    parent <id>                     Show a node's parent
    users [type]                    List users (default: active)
    report <id>                     Show a staff report's measurements
    reports [own|all]               Search staff reports
    request <endpoint> [METHOD] [json]
                                    Call an arbitrary endpoint, e.g. '?q=gmaservices/gma_node'
    help                            Show this help message
    version                         Show version information

ENVIRONMENT:
    GMA_URL            GMA service URL (required)
    CAS_USERNAME       CAS username (required)
    CAS_PASSWORD       CAS password (required)
    CAS_URL            CAS base URL (default: https://thekey.me/cas/)
    GMA_LANGUAGE       Language id sent with every request
    GMA_SERVICE_URL    Fixed CAS service callback, skips the probe
    GMA_CSRF           Set to 0 to skip fetching a CSRF token
    GMA_MAX_RETRIES    Retries after a rejected call (default: 3)
    GMA_TIMEOUT_SECS   Request timeout in seconds (default: 30)

EXIT CODES:
    0  success
    1  usage or configuration error
    2  the service kept rejecting the session
"#
    );
}
