use std::time::Duration;

use futures::{SinkExt, StreamExt};
use skytalk_realtime::{Client, ConnectConfig, Session};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

#[tokio::test]
async fn test_local_roundtrip() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (hdr_tx, hdr_rx) = std::sync::mpsc::channel::<(String, String, String)>();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            let header = |name: &str| {
                req.headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            };
            let query = req.uri().query().unwrap_or_default().to_string();
            hdr_tx
                .send((header("authorization"), header("openai-beta"), query))
                .unwrap();
            Ok(resp)
        })
        .await
        .unwrap();

        ws.send(Message::Text(
            r#"{"type":"session.created","session":{"id":"sess_1","model":"m"}}"#.into(),
        ))
        .await
        .unwrap();

        let received = match ws.next().await {
            Some(Ok(Message::Text(text))) => text.to_string(),
            other => panic!("unexpected frame: {other:?}"),
        };

        ws.send(Message::Text(
            r#"{"type":"response.audio.delta","delta":"AQIDBA=="}"#.into(),
        ))
        .await
        .unwrap();
        ws.close(None).await.unwrap();
        received
    });

    let client = Client::builder("sk-test")
        .websocket_url(format!("ws://{}/v1/realtime", addr))
        .build()
        .unwrap();
    let mut session = client
        .connect_websocket(Some(&ConnectConfig {
            model: "test-model".into(),
        }))
        .await
        .unwrap();

    let created = session.recv().await.unwrap().unwrap();
    assert_eq!(created.event_type, "session.created");
    assert_eq!(session.session_id().as_deref(), Some("sess_1"));

    session.commit_input().await.unwrap();

    let delta = session.recv().await.unwrap().unwrap();
    assert_eq!(delta.audio.as_deref(), Some(&[1u8, 2, 3, 4][..]));

    let end = tokio::time::timeout(Duration::from_secs(5), session.recv())
        .await
        .unwrap();
    assert!(end.is_none());

    let received = server.await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&received).unwrap();
    assert_eq!(value["type"], "input_audio_buffer.commit");
    assert!(value["event_id"].as_str().unwrap().starts_with("evt_"));

    let (auth, beta, query) = hdr_rx.recv().unwrap();
    assert_eq!(auth, "Bearer sk-test");
    assert_eq!(beta, "realtime=v1");
    assert_eq!(query, "model=test-model");
}

#[tokio::test]
async fn test_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::builder("sk-test")
        .websocket_url(format!("ws://{}/v1/realtime", addr))
        .build()
        .unwrap();
    let err = client.connect_websocket(None).await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
#[ignore]
async fn test_openai_realtime_live() {
    let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY required");

    let client = Client::new(api_key).expect("build client");
    let mut session = client.connect_websocket(None).await.expect("connect");

    let first = tokio::time::timeout(Duration::from_secs(20), session.recv())
        .await
        .expect("timeout waiting first event")
        .expect("stream ended")
        .expect("server error");
    assert_eq!(first.event_type, "session.created");
    session.close().await.unwrap();
}
