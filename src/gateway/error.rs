use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("invalid request: {0}")]
    Request(#[from] axum::http::Error),
    #[error("invalid request target: {0}")]
    Target(#[from] url::ParseError),
    #[error("body is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("handler body stream failed: {0}")]
    Stream(String),
}
