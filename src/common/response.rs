use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// JSON body returned by every failing request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            details: None,
        }
    }

    pub fn with_details(error: &str, details: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            details: Some(details.into()),
        }
    }
}

pub struct ApiError(pub ErrorResponse, pub StatusCode);

impl ApiError {
    pub fn bad_request(message: &str) -> Self {
        Self(ErrorResponse::new(message), StatusCode::BAD_REQUEST)
    }

    pub fn internal(message: &str, details: Option<String>) -> Self {
        let body = match details {
            Some(details) => ErrorResponse::with_details(message, details),
            None => ErrorResponse::new(message),
        };
        Self(body, StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (body, status) = (self.0, self.1);
        (status, Json(body)).into_response()
    }
}
