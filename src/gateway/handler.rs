use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use bytes::Bytes;
use futures_util::{stream::BoxStream, StreamExt};
use tower::ServiceExt;

use super::error::AdapterError;

/// A piece of the handler's body. Text is sent as UTF-8.
#[derive(Debug, Clone)]
pub enum BodyChunk {
    Bytes(Bytes),
    Text(String),
}

impl BodyChunk {
    pub fn into_bytes(self) -> Bytes {
        match self {
            BodyChunk::Bytes(bytes) => bytes,
            BodyChunk::Text(text) => Bytes::from(text),
        }
    }
}

pub type ChunkStream = BoxStream<'static, Result<BodyChunk, AdapterError>>;

/// What a handler produced: status line (`"404 Not Found"`), header list in
/// emission order and a stream of body chunks.
pub struct HandlerResponse {
    pub status: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: ChunkStream,
}

impl HandlerResponse {
    pub fn from_response(response: Response<Body>) -> Self {
        let (parts, body) = response.into_parts();

        let status = format!(
            "{} {}",
            parts.status.as_str(),
            parts.status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string();

        let headers = parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = body
            .into_data_stream()
            .map(|chunk| {
                chunk
                    .map(BodyChunk::Bytes)
                    .map_err(|e| AdapterError::Stream(e.to_string()))
            })
            .boxed();

        Self {
            status: Some(status),
            headers,
            body,
        }
    }
}

#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn call(&self, request: Request<Body>) -> Result<HandlerResponse, AdapterError>;
}

#[async_trait]
impl RequestHandler for Router {
    async fn call(&self, request: Request<Body>) -> Result<HandlerResponse, AdapterError> {
        let response = match self.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        Ok(HandlerResponse::from_response(response))
    }
}
