use std::path::PathBuf;
use std::time::Duration;

use crate::config::env::{self, EnvKey};

/// Upper bound on a request body, matching the form's advertised limit.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;
pub const DEFAULT_ENCODE_TIMEOUT_SECS: u64 = 600;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub ffmpeg_bin: String,
    pub encode_timeout: Duration,
    /// When false every upload is handed to the encoder regardless of its extension.
    pub enforce_extensions: bool,
}

impl AppConfig {
    pub fn new() -> Self {
        let upload_dir = env::get(EnvKey::UploadDir)
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir());

        Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 5000),
            upload_dir,
            max_upload_bytes: env::get_parsed(EnvKey::MaxUploadBytes, DEFAULT_MAX_UPLOAD_BYTES),
            ffmpeg_bin: env::get_or(EnvKey::FfmpegBin, "ffmpeg"),
            encode_timeout: Duration::from_secs(env::get_parsed(
                EnvKey::EncodeTimeoutSecs,
                DEFAULT_ENCODE_TIMEOUT_SECS,
            )),
            enforce_extensions: env::get_parsed(EnvKey::EnforceExtensions, false),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 5000,
            upload_dir: std::env::temp_dir(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            ffmpeg_bin: "ffmpeg".to_string(),
            encode_timeout: Duration::from_secs(DEFAULT_ENCODE_TIMEOUT_SECS),
            enforce_extensions: false,
        }
    }
}
