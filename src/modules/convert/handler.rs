use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::{Html, IntoResponse, Response},
};

use super::error::ConvertError;
use super::service::ConvertService;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../../static/index.html");

/// Upload form
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Upload form", body = String, content_type = "text/html")
    ),
    tag = "Convert"
)]
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Convert an uploaded media file to MP3
/// The file is streamed to disk, encoded with ffmpeg and sent back as an attachment
#[utoipa::path(
    post,
    path = "/convert",
    request_body(content = super::dto::ConvertForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Encoded MP3", body = String, content_type = "audio/mpeg"),
        (status = 400, description = "Missing or empty file", body = crate::common::response::ErrorResponse),
        (status = 413, description = "Upload too large", body = crate::common::response::ErrorResponse),
        (status = 500, description = "Encoding failed", body = crate::common::response::ErrorResponse)
    ),
    tag = "Convert"
)]
pub async fn convert(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    // A body that is not multipart carries no file part.
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::warn!("Conversion rejected: {}", rejection.body_text());
            return ConvertError::NoFile.into_response();
        }
    };

    match run(&state, multipart).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Conversion rejected: {}", e);
            e.into_response()
        }
    }
}

async fn run(state: &AppState, multipart: Multipart) -> Result<Response, ConvertError> {
    let job = ConvertService::receive(state, multipart).await?;
    ConvertService::encode(state, &job).await?;
    ConvertService::respond(job).await
}
