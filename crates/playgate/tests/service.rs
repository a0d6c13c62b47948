//! End-to-end tests: a full attempt against a real HTTP backend
//! (`wiremock::MockServer`), through the public `AuthService` API.

use std::time::Duration;

use playgate::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Signs in as Ann and hands out `tok-1`.
struct AnnProvider;

impl IdentityProvider for AnnProvider {
    async fn sign_in(&self) -> SignIn {
        SignIn::Connected(LoginInfo {
            account_name: "ann@example.com".into(),
            display_name: "Ann".into(),
            player_id: "g-1".into(),
        })
    }

    async fn fetch_token(&self, _account: &str, _scope: &str) -> Result<String, SessionError> {
        Ok("tok-1".into())
    }
}

/// The user always backs out.
struct DecliningProvider;

impl IdentityProvider for DecliningProvider {
    async fn sign_in(&self) -> SignIn {
        SignIn::Cancelled
    }

    async fn fetch_token(&self, _account: &str, _scope: &str) -> Result<String, SessionError> {
        Err(SessionError::TokenExchangeFailed("not signed in".into()))
    }
}

async fn next_event(rx: &mut UnboundedReceiver<SinkMessage>) -> SinkMessage {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("sink closed")
}

fn login(result: LoginResult) -> SinkMessage {
    SinkMessage::Event(HostEvent::LoginResult(result))
}

#[tokio::test]
async fn test_happy_path_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .and(body_json(serde_json::json!({
            "playerId": "g-1",
            "serverPlayerId": "",
            "network": "GOOGLE",
            "playerName": "Ann",
            "token": "tok-1",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "sid=abc; Path=/")
                .set_body_json(serde_json::json!({
                    "realPlayerID": "p1",
                    "playerName": "Ann",
                    "isAnonymous": false,
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (sink, mut events) = ChannelSink::new();
    let service = AuthService::builder().build(AnnProvider, sink).unwrap();

    service
        .begin(AttemptParams::new("client-1", format!("{}/auth", server.uri())))
        .await
        .unwrap();

    assert_eq!(next_event(&mut events).await, login(LoginResult::Success));
    let snapshot = service.snapshot().await.unwrap();
    assert_eq!(snapshot.server_player_id.as_deref(), Some("p1"));
    assert_eq!(snapshot.session_token, "abc");
    assert!(!snapshot.anonymous);
}

#[tokio::test]
async fn test_non_ascii_first_cookie_still_wins_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "sid=café; Path=/")
                .append_header("set-cookie", "other=zzz; Path=/")
                .set_body_json(serde_json::json!({
                    "realPlayerID": "p1",
                    "playerName": "Ann",
                    "isAnonymous": false,
                })),
        )
        .mount(&server)
        .await;

    let (sink, mut events) = ChannelSink::new();
    let service = AuthService::builder().build(AnnProvider, sink).unwrap();

    service
        .begin(AttemptParams::new("client-1", server.uri()))
        .await
        .unwrap();

    assert_eq!(next_event(&mut events).await, login(LoginResult::Success));
    let snapshot = service.snapshot().await.unwrap();
    assert_eq!(snapshot.session_token, "café");
}

#[tokio::test]
async fn test_declined_login_still_creates_anonymous_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "realPlayerID": "p-anon",
            "playerName": "",
            "isAnonymous": true,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (sink, mut events) = ChannelSink::new();
    let service = AuthService::builder().build(DecliningProvider, sink).unwrap();

    service
        .begin(AttemptParams::new("client-1", server.uri()))
        .await
        .unwrap();

    assert_eq!(next_event(&mut events).await, login(LoginResult::Cancel));
    let snapshot = service.snapshot().await.unwrap();
    assert!(snapshot.anonymous);
    assert_eq!(snapshot.server_player_id.as_deref(), Some("p-anon"));
}

#[tokio::test]
async fn test_backend_403_fails_with_fixed_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let (sink, mut events) = ChannelSink::new();
    let service = AuthService::builder().build(AnnProvider, sink).unwrap();

    service
        .begin(AttemptParams::new("client-1", server.uri()))
        .await
        .unwrap();

    assert_eq!(next_event(&mut events).await, login(LoginResult::Failure));
    let snapshot = service.snapshot().await.unwrap();
    assert_eq!(snapshot.failure_error.as_deref(), Some("Server auth failed"));
    assert!(snapshot.anonymous);
}

#[tokio::test]
async fn test_unreachable_backend_fails_with_transport_text() {
    let (sink, mut events) = ChannelSink::new();
    let service = AuthService::builder()
        .connect_timeout(Duration::from_secs(2))
        .build(AnnProvider, sink)
        .unwrap();

    service
        .begin(AttemptParams::new("client-1", "http://127.0.0.1:1/auth"))
        .await
        .unwrap();

    assert_eq!(next_event(&mut events).await, login(LoginResult::Failure));
    let snapshot = service.snapshot().await.unwrap();
    let detail = snapshot.failure_error.expect("failure detail recorded");
    assert!(!detail.is_empty());
    assert_ne!(detail, "Server auth failed");
    assert!(snapshot.anonymous);
}

#[tokio::test]
async fn test_shutdown_then_begin_is_unavailable() {
    let (sink, _events) = ChannelSink::new();
    let service = AuthService::builder().build(AnnProvider, sink).unwrap();

    service.shutdown().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let err = service
        .begin(AttemptParams::new("client-1", "http://127.0.0.1:1"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlaygateError::Engine(_)));
}
