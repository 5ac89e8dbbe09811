use axum::{
    extract::multipart::MultipartError,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::common::response::{ApiError, ErrorResponse};
use crate::infrastructure::ffmpeg::EncodeError;

pub const MSG_NO_FILE: &str = "No file received";
pub const MSG_EMPTY_FILENAME: &str = "No file selected";
pub const MSG_UNSUPPORTED: &str = "Unsupported file format";
pub const MSG_ENCODE_FAILED: &str = "Conversion failed. Check that ffmpeg is installed.";
pub const MSG_MISSING_ENCODER: &str = "ffmpeg not found. Install ffmpeg and restart the server.";
pub const MSG_TIMED_OUT: &str = "Conversion timed out";
pub const MSG_UNEXPECTED: &str = "Unexpected error";
pub const MSG_BAD_UPLOAD: &str = "Invalid upload";

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("no file part in request")]
    NoFile,
    #[error("file part has an empty filename")]
    EmptyFilename,
    #[error("unsupported file extension: {0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl IntoResponse for ConvertError {
    fn into_response(self) -> Response {
        match self {
            ConvertError::NoFile => ApiError::bad_request(MSG_NO_FILE).into_response(),
            ConvertError::EmptyFilename => ApiError::bad_request(MSG_EMPTY_FILENAME).into_response(),
            ConvertError::UnsupportedFormat(_) => ApiError::bad_request(MSG_UNSUPPORTED).into_response(),
            ConvertError::Multipart(e) => {
                ApiError(ErrorResponse::with_details(MSG_BAD_UPLOAD, e.body_text()), e.status()).into_response()
            }
            ConvertError::Encode(EncodeError::MissingBinary(_)) => {
                ApiError::internal(MSG_MISSING_ENCODER, None).into_response()
            }
            ConvertError::Encode(EncodeError::Failed { details }) => {
                ApiError::internal(MSG_ENCODE_FAILED, Some(details)).into_response()
            }
            ConvertError::Encode(e @ EncodeError::TimedOut(_)) => {
                ApiError::internal(MSG_TIMED_OUT, Some(e.to_string())).into_response()
            }
            ConvertError::Encode(EncodeError::Io(e)) => {
                ApiError::internal(MSG_UNEXPECTED, Some(e.to_string())).into_response()
            }
            ConvertError::Unexpected(e) => ApiError::internal(MSG_UNEXPECTED, Some(e.to_string())).into_response(),
        }
    }
}
