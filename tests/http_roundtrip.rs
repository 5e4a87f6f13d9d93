// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! End-to-end handshake and API calls over the reqwest transport

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use url::form_urlencoded;
use wiremock::matchers::{
    body_json, body_string, body_string_contains, header, method, path, query_param,
};
use tracing_subscriber::fmt::MakeWriter;
use wiremock::{Mock, MockServer, ResponseTemplate};

use gma_client::{ApiCall, ClientConfig, Error, GmaClient, RetryPolicy};

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(format!("{}/gma/", server.uri()))
        .cas_url(format!("{}/cas/", server.uri()))
        .credentials("staff@example.org", "secret")
        .retry(RetryPolicy::immediate(3))
}

/// Log sink shared between the subscriber and the test
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn service_url(server: &MockServer) -> String {
    format!("{}/gma/?q=en/cas", server.uri())
}

/// Ticket endpoint, TGT, and a callback that sets the session without a second hop
async fn mount_fixed_cas(server: &MockServer, expected_logins: u64) {
    Mock::given(method("POST"))
        .and(path("/cas/v1/tickets"))
        .and(body_string("username=staff%40example.org&password=secret"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Location", format!("{}/cas/v1/tickets/TGT-1", server.uri()).as_str()),
        )
        .expect(expected_logins)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cas/v1/tickets/TGT-1"))
        .and(body_string_contains("service="))
        .respond_with(ResponseTemplate::new(200).set_body_string("ST-1"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gma/"))
        .and(query_param("q", "en/cas"))
        .and(query_param("ticket", "ST-1"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("Set-Cookie", "SESSreal=live; path=/; HttpOnly"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_probe_handshake_and_api_call() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let service: String = form_urlencoded::byte_serialize(service_url(&server).as_bytes()).collect();

    // Specific mocks first: the probe mock below matches any GET on /gma/
    Mock::given(method("POST"))
        .and(path("/cas/v1/tickets"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Location", format!("{}/cas/v1/tickets/TGT-9", uri).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cas/v1/tickets/TGT-9"))
        .and(body_string(format!("service={}", service)))
        .respond_with(ResponseTemplate::new(200).set_body_string("ST-9"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gma/"))
        .and(query_param("q", "en/cas"))
        .and(query_param("ticket", "ST-9"))
        .and(header("cookie", "SESSpre=pre"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/gma/?q=en/node", uri).as_str())
                .insert_header("Set-Cookie", "SESSpre=stale; path=/"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gma/"))
        .and(query_param("q", "en/node"))
        .and(header("cookie", "SESSpre=pre"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("Set-Cookie", "SESSreal=live; path=/; HttpOnly"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gma/"))
        .and(query_param("q", "services/session/token"))
        .and(header("cookie", "SESSreal=live"))
        .respond_with(ResponseTemplate::new(200).set_body_string("tok-1"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gma/"))
        .and(query_param("q", "gmaservices/gma_node/7"))
        .and(query_param("languageId", "3"))
        .and(header("cookie", "SESSreal=live"))
        .and(header("x-csrf-token", "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nodeId": 7, "name": "Campus"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gma/"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/cas/login?service={}", uri, service).as_str())
                .insert_header("Set-Cookie", "SESSpre=pre; path=/"),
        )
        .mount(&server)
        .await;

    let mut client = GmaClient::new(config(&server).language("3")).unwrap();
    let node = assert_ok!(client.get_node(7).await);

    assert_eq!(node, Some(json!({"nodeId": 7, "name": "Campus"})));
    assert_eq!(client.session_cookie(), Some("SESSreal=live"));
    assert_eq!(client.csrf_token(), Some("tok-1"));
}

#[tokio::test]
async fn test_server_error_triggers_reauthentication() {
    let server = MockServer::start().await;
    mount_fixed_cas(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/gma/"))
        .and(query_param("q", "gmaservices/gma_language"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gma/"))
        .and(query_param("q", "gmaservices/gma_language"))
        .and(header("cookie", "SESSreal=live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"languageId": 1}])))
        .mount(&server)
        .await;

    let config = config(&server).fixed_service(service_url(&server)).without_csrf();
    let mut client = GmaClient::new(config).unwrap();

    let languages = assert_ok!(client.get_languages().await);
    assert_eq!(languages, Some(json!([{"languageId": 1}])));
}

#[tokio::test]
async fn test_not_found_is_absent() {
    let server = MockServer::start().await;
    mount_fixed_cas(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/gma/"))
        .and(query_param("q", "gmaservices/gma_node/404/parent"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = config(&server).fixed_service(service_url(&server)).without_csrf();
    let mut client = GmaClient::new(config).unwrap();

    assert_eq!(assert_ok!(client.get_node_parent(404).await), None);
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_persistent_rejection_exhausts_retries() {
    let server = MockServer::start().await;
    mount_fixed_cas(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/gma/"))
        .and(query_param("q", "gmaservices/gma_node"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "https://thekey.me/cas/login"))
        .expect(2)
        .mount(&server)
        .await;

    let config = config(&server).fixed_service(service_url(&server)).without_csrf();
    let mut client = GmaClient::new(config).unwrap();

    let err = assert_err!(
        client
            .execute(ApiCall::get("?q=gmaservices/gma_node").max_retries(1))
            .await
    );
    assert!(err.is_fatal());
    assert!(matches!(
        err,
        Error::RetriesExhausted { attempts: 2, last_status: Some(302), .. }
    ));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_json_payload_round_trip() {
    let server = MockServer::start().await;
    mount_fixed_cas(&server, 1).await;

    let payload = json!({"maxResult": 0, "nodeId": [1, 2], "dateWithin": "20260115"});
    Mock::given(method("POST"))
        .and(path("/gma/"))
        .and(query_param("q", "gmaservices/gma_staffReport/searchOwn"))
        .and(header("content-type", "application/json"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(&payload))
        .expect(1)
        .mount(&server)
        .await;

    let config = config(&server).fixed_service(service_url(&server)).without_csrf();
    let mut client = GmaClient::new(config).unwrap();

    let echoed = assert_ok!(
        client
            .execute(ApiCall::post("?q=gmaservices/gma_staffReport/searchOwn", payload.clone()))
            .await
    );
    assert_eq!(echoed.into_option(), Some(payload));
}

#[tokio::test]
async fn test_failed_callback_keeps_tickets_out_of_logs() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("POST"))
        .and(path("/cas/v1/tickets"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Location", format!("{}/cas/v1/tickets/TGT-7-hidden", uri).as_str()),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cas/v1/tickets/TGT-7-hidden"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ST-SECRET-42"))
        .mount(&server)
        .await;

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("gma_client=trace")
        .with_ansi(false)
        .with_writer(logs.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    // Nothing listens on port 1, so the callback hop fails to connect
    let config = config(&server)
        .fixed_service("http://127.0.0.1:1/gma/?q=en/cas")
        .without_csrf()
        .timeout(Duration::from_secs(5));
    let mut client = GmaClient::new(config).unwrap();

    assert!(!client.authenticate().await);

    let logs = logs.contents();
    assert!(logs.contains("CAS handshake failed"), "{}", logs);
    assert!(logs.contains("service-callback"), "{}", logs);
    assert!(!logs.contains("ST-SECRET-42"), "{}", logs);
    assert!(!logs.contains("TGT-7-hidden"), "{}", logs);
}
