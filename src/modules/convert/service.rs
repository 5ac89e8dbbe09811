use std::path::Path;

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart},
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use futures_util::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::info;

use super::dto::Quality;
use super::error::ConvertError;
use super::model::{ConversionJob, WorkDir};
use crate::common::upload::stream_to_file;
use crate::state::AppState;

pub const AUDIO_MPEG: &str = "audio/mpeg";
const FALLBACK_NAME: &str = "audio";

/// Extensions the encoder is known to read. Only consulted when enforcement is on.
pub const ALLOWED_EXTS: &[&str] = &[
    "mp4", "mkv", "mov", "avi", "webm", "m4v", "flv", "ts", "3gp", "ogg", "ogv", "wav", "mp3", "aac", "m4a",
    "flac", "wma", "wmv",
];

pub fn is_allowed_file(filename: &str, enforce: bool) -> bool {
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return true;
    };
    !enforce || ALLOWED_EXTS.contains(&ext.to_lowercase().as_str())
}

/// Turns a user supplied name into a safe `<name>.mp3` download name.
pub fn sanitize_output_name(name: &str) -> String {
    let base = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    let filtered: String = base
        .chars()
        .filter(|ch| ch.is_alphanumeric() || matches!(ch, ' ' | '-' | '_' | '.'))
        .collect();
    let mut cleaned = filtered.trim().replace(' ', "_");

    while cleaned
        .get(cleaned.len().saturating_sub(4)..)
        .is_some_and(|tail| tail.eq_ignore_ascii_case(".mp3"))
    {
        cleaned.truncate(cleaned.len() - 4);
    }

    if cleaned.is_empty() {
        cleaned = FALLBACK_NAME.to_string();
    }
    format!("{}.mp3", cleaned)
}

/// Requested name when one was given, otherwise derived from the upload's base name.
pub fn download_name(output_name: Option<&str>, upload_name: &str) -> String {
    match output_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(requested) => sanitize_output_name(requested),
        None => {
            let stem = Path::new(upload_name)
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.is_empty())
                .unwrap_or(FALLBACK_NAME);
            sanitize_output_name(stem)
        }
    }
}

pub fn content_disposition(filename: &str) -> String {
    if filename.is_ascii() {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let ascii: String = filename.chars().filter(char::is_ascii).collect();
    let fallback = if ascii.trim_end_matches(".mp3").trim_matches(|c| c == '_' || c == '.').is_empty() {
        format!("{}.mp3", FALLBACK_NAME)
    } else {
        ascii
    };
    let encoded: String = url::form_urlencoded::byte_serialize(filename.as_bytes()).collect();
    format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", fallback, encoded)
}

pub struct ConvertService;

impl ConvertService {
    /// Reads the multipart form, saving the first `file` part into a fresh work dir.
    pub async fn receive(state: &AppState, mut multipart: Multipart) -> Result<ConversionJob, ConvertError> {
        let mut job: Option<ConversionJob> = None;
        let mut saw_empty_filename = false;
        let mut quality = Quality::default();
        let mut output_name: Option<String> = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();

            match name.as_str() {
                "file" if job.is_none() && !saw_empty_filename => {
                    // A part without a filename is a plain form value, not an upload.
                    let Some(file_name) = field.file_name().map(str::to_string) else {
                        continue;
                    };
                    if file_name.is_empty() {
                        saw_empty_filename = true;
                        continue;
                    }
                    if !is_allowed_file(&file_name, state.config.enforce_extensions) {
                        return Err(ConvertError::UnsupportedFormat(file_name));
                    }

                    let workdir = WorkDir::create(&state.config.upload_dir)
                        .await
                        .map_err(|e| anyhow::anyhow!("Failed to create work dir: {}", e))?;
                    let new_job = ConversionJob::new(workdir, file_name);

                    let bytes = stream_to_file(field, &new_job.input_path)
                        .await
                        .map_err(|e| match e.downcast::<MultipartError>() {
                            Ok(multipart_err) => ConvertError::Multipart(multipart_err),
                            Err(other) => ConvertError::Unexpected(other),
                        })?;
                    info!("Received upload {} ({} bytes)", new_job.upload_name, bytes);
                    job = Some(new_job);
                }
                "quality" => quality = Quality::parse(&field.text().await?),
                "output_name" => {
                    let text = field.text().await?;
                    let trimmed = text.trim();
                    output_name = (!trimmed.is_empty()).then(|| trimmed.to_string());
                }
                _ => {}
            }
        }

        let mut job = match job {
            Some(job) => job,
            None if saw_empty_filename => return Err(ConvertError::EmptyFilename),
            None => return Err(ConvertError::NoFile),
        };
        job.quality = quality;
        job.output_name = output_name;
        Ok(job)
    }

    pub async fn encode(state: &AppState, job: &ConversionJob) -> Result<(), ConvertError> {
        let bitrate = job.quality.bitrate();
        info!("Converting {} at {}", job.upload_name, bitrate);
        state.encoder.encode(&job.input_path, &job.output_path, bitrate).await?;
        Ok(())
    }

    /// Streams the encoded file back as an attachment. The job's work dir lives
    /// inside the body stream and goes away once the body is finished or dropped.
    pub async fn respond(job: ConversionJob) -> Result<Response, ConvertError> {
        let filename = download_name(job.output_name.as_deref(), &job.upload_name);
        let file = tokio::fs::File::open(&job.output_path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open encoded file: {}", e))?;
        let length = file
            .metadata()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to stat encoded file: {}", e))?
            .len();

        let disposition = HeaderValue::from_str(&content_disposition(&filename))
            .map_err(|e| anyhow::anyhow!("Invalid download name: {}", e))?;

        let workdir = job.workdir;
        let stream = ReaderStream::new(file).map(move |chunk| {
            let _keep = &workdir;
            chunk
        });

        info!("Sending {} ({} bytes)", filename, length);

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, AUDIO_MPEG)
            .header(header::CONTENT_DISPOSITION, disposition)
            .header(header::CONTENT_LENGTH, length)
            .header(header::CACHE_CONTROL, "no-cache")
            .body(Body::from_stream(stream))
            .map_err(|e| ConvertError::Unexpected(e.into()))
    }
}
