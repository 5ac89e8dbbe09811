use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
}

impl Quality {
    /// Case-insensitive; anything unrecognised is treated as `Medium`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "low" => Quality::Low,
            "high" => Quality::High,
            _ => Quality::Medium,
        }
    }

    pub fn bitrate(&self) -> &'static str {
        match self {
            Quality::Low => "96k",
            Quality::Medium => "192k",
            Quality::High => "320k",
        }
    }
}

/// Multipart form accepted by `POST /convert`. Only used for the OpenAPI document;
/// the handler reads the parts as a stream.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ConvertForm {
    /// Audio or video file to convert.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    pub quality: Option<Quality>,
    /// Download name; sanitized and given a `.mp3` extension.
    pub output_name: Option<String>,
}
