//! Gateway adapter tests: event translation, reply assembly and the full
//! round trip through the conversion router.

use std::sync::Mutex;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use mp3_converter::gateway::{
    self, AdapterError, BodyChunk, GatewayEvent, HandlerResponse, RequestHandler,
};
use serde_json::json;

mod common;

use common::{multipart_body, multipart_content_type, Part, TestApp};

#[derive(Debug, Default)]
struct Seen {
    method: String,
    uri: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

/// Records the translated request and replies with a fixed response.
struct ScriptedHandler {
    status: Option<&'static str>,
    headers: Vec<(&'static str, &'static str)>,
    chunks: Vec<BodyChunk>,
    seen: Mutex<Seen>,
}

impl ScriptedHandler {
    fn new(status: Option<&'static str>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            chunks: Vec::new(),
            seen: Mutex::new(Seen::default()),
        }
    }
}

#[async_trait]
impl RequestHandler for ScriptedHandler {
    async fn call(&self, request: Request<Body>) -> Result<HandlerResponse, AdapterError> {
        let (parts, body) = request.into_parts();
        let body = to_bytes(body, usize::MAX).await.unwrap();
        {
            let mut seen = self.seen.lock().unwrap();
            seen.method = parts.method.to_string();
            seen.uri = parts.uri.to_string();
            seen.headers = parts
                .headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap().to_string()))
                .collect();
            seen.body = body.to_vec();
        }

        let chunks: Vec<Result<BodyChunk, AdapterError>> = self.chunks.iter().cloned().map(Ok).collect();
        Ok(HandlerResponse {
            status: self.status.map(str::to_string),
            headers: self
                .headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: stream::iter(chunks).boxed(),
        })
    }
}

struct FailingHandler;

#[async_trait]
impl RequestHandler for FailingHandler {
    async fn call(&self, _request: Request<Body>) -> Result<HandlerResponse, AdapterError> {
        Err(AdapterError::Stream("handler exploded".into()))
    }
}

fn event(value: serde_json::Value) -> GatewayEvent {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_base64_body_is_decoded_for_handler() {
    let handler = ScriptedHandler::new(Some("200 OK"));
    let reply = gateway::handle(
        event(json!({"httpMethod": "POST", "path": "/echo", "body": "aGVsbG8=", "isBase64Encoded": true})),
        &handler,
    )
    .await
    .unwrap();

    let seen = handler.seen.lock().unwrap();
    assert_eq!(seen.body, b"hello");
    assert_eq!(seen.method, "POST");
    assert!(seen.headers.contains(&("content-length".to_string(), "5".to_string())));
    assert_eq!(reply.status_code, 200);
}

#[tokio::test]
async fn test_encoding_marker_also_triggers_base64() {
    let handler = ScriptedHandler::new(None);
    gateway::handle(event(json!({"body": "aGVsbG8=", "encoding": "base64"})), &handler)
        .await
        .unwrap();
    assert_eq!(handler.seen.lock().unwrap().body, b"hello");
}

#[tokio::test]
async fn test_plain_text_body_uses_declared_charset() {
    let handler = ScriptedHandler::new(None);
    gateway::handle(
        event(json!({"method": "PUT", "body": "café", "headers": {"Content-Encoding": "ascii"}})),
        &handler,
    )
    .await
    .unwrap();
    assert_eq!(handler.seen.lock().unwrap().body, b"caf");
}

#[tokio::test]
async fn test_path_query_and_headers_are_translated() {
    let handler = ScriptedHandler::new(None);
    gateway::handle(
        event(json!({
            "path": "/api/items",
            "queryStringParameters": {"q": "a b", "page": "2", "unused": null},
            "headers": {"Host": "example.com:8443", "X-Custom": "yes", "Content-Length": "999"}
        })),
        &handler,
    )
    .await
    .unwrap();

    let seen = handler.seen.lock().unwrap();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.uri, "/items?q=a+b&page=2");
    assert!(seen.headers.contains(&("host".to_string(), "example.com:8443".to_string())));
    assert!(seen.headers.contains(&("x-custom".to_string(), "yes".to_string())));
    assert!(seen.headers.contains(&("content-length".to_string(), "0".to_string())));
}

#[tokio::test]
async fn test_status_line_sets_status_code() {
    let handler = ScriptedHandler::new(Some("404 Not Found"));
    let reply = gateway::handle(GatewayEvent::default(), &handler).await.unwrap();
    assert_eq!(reply.status_code, 404);
}

#[tokio::test]
async fn test_missing_status_defaults_to_200() {
    let handler = ScriptedHandler::new(None);
    let reply = gateway::handle(GatewayEvent::default(), &handler).await.unwrap();
    assert_eq!(reply.status_code, 200);
}

#[tokio::test]
async fn test_repeated_headers_are_joined() {
    let mut handler = ScriptedHandler::new(Some("200 OK"));
    handler.headers = vec![("X-A", "1"), ("Content-Type", "text/plain"), ("X-A", "2")];
    let reply = gateway::handle(GatewayEvent::default(), &handler).await.unwrap();

    assert_eq!(reply.headers.get("X-A").map(String::as_str), Some("1, 2"));
    assert_eq!(reply.headers.get("Content-Type").map(String::as_str), Some("text/plain"));
}

#[tokio::test]
async fn test_chunks_are_concatenated_and_base64_encoded() {
    let mut handler = ScriptedHandler::new(Some("200 OK"));
    handler.chunks = vec![
        BodyChunk::Text("hé".into()),
        BodyChunk::Bytes(Bytes::from_static(b"llo")),
    ];
    let reply = gateway::handle(GatewayEvent::default(), &handler).await.unwrap();

    assert_eq!(reply.encoding, "base64");
    assert_eq!(reply.body, STANDARD.encode("héllo".as_bytes()));
    assert_eq!(reply.body_bytes().unwrap(), "héllo".as_bytes());
}

#[tokio::test]
async fn test_handler_faults_propagate() {
    let result = gateway::handle(GatewayEvent::default(), &FailingHandler).await;
    assert!(matches!(result, Err(AdapterError::Stream(_))));
}

#[tokio::test]
async fn test_reply_serializes_with_gateway_field_names() {
    let handler = ScriptedHandler::new(Some("201 Created"));
    let reply = gateway::handle(GatewayEvent::default(), &handler).await.unwrap();
    let value = serde_json::to_value(&reply).unwrap();

    assert_eq!(value["statusCode"], 201);
    assert_eq!(value["encoding"], "base64");
    assert!(value["headers"].is_object());
    assert!(value["body"].is_string());
}

#[tokio::test]
async fn test_router_round_trip_index_page() {
    let app = TestApp::new(|_| {});
    let reply = gateway::handle(event(json!({"method": "GET", "path": "/api"})), &app.router)
        .await
        .unwrap();

    assert_eq!(reply.status_code, 200);
    assert!(reply.headers["Content-Type"].starts_with("text/html"));
    let html = String::from_utf8(reply.body_bytes().unwrap()).unwrap();
    assert!(html.contains("<form"));
}

#[tokio::test]
async fn test_router_round_trip_convert_without_file() {
    let app = TestApp::new(|_| {});
    let body = multipart_body(&[Part::Text("quality", "low")]);
    let reply = gateway::handle(
        event(json!({
            "httpMethod": "POST",
            "path": "/api/convert",
            "headers": {"Content-Type": multipart_content_type()},
            "body": STANDARD.encode(&body),
            "isBase64Encoded": true
        })),
        &app.router,
    )
    .await
    .unwrap();

    assert_eq!(reply.status_code, 400);
    let json: serde_json::Value = serde_json::from_slice(&reply.body_bytes().unwrap()).unwrap();
    assert!(json.get("error").is_some());
}

#[cfg(unix)]
#[tokio::test]
async fn test_router_round_trip_successful_conversion() {
    let app = TestApp::with_stub_encoder(common::COPY_SCRIPT, |_| {});
    let body = multipart_body(&[
        Part::Text("quality", "low"),
        Part::File {
            name: "file",
            filename: "voice.ogg",
            data: b"pretend audio",
        },
    ]);
    let reply = gateway::handle(
        event(json!({
            "method": "POST",
            "path": "/api/convert",
            "headers": {"content-type": multipart_content_type()},
            "body": STANDARD.encode(&body),
            "encoding": "base64"
        })),
        &app.router,
    )
    .await
    .unwrap();

    assert_eq!(reply.status_code, 200);
    assert_eq!(reply.headers["Content-Type"], "audio/mpeg");
    assert_eq!(reply.headers["Content-Disposition"], "attachment; filename=\"voice.mp3\"");
    assert_eq!(reply.body_bytes().unwrap(), b"pretend audio");
    assert!(app.settled_work_dirs().await.is_empty());
}
