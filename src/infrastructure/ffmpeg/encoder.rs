use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{error, info, warn};

/// How much of the encoder's stderr is kept for error reports.
pub const DIAGNOSTIC_TAIL_CHARS: usize = 4000;

const AUDIO_CODEC: &str = "libmp3lame";

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("encoder binary `{0}` not found")]
    MissingBinary(String),
    #[error("encoder exited unsuccessfully")]
    Failed { details: String },
    #[error("encoder did not finish within {0:?}")]
    TimedOut(Duration),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Clone, Debug)]
pub struct Encoder {
    bin: String,
    timeout: Duration,
}

impl Encoder {
    pub fn new(bin: &str, timeout: Duration) -> Self {
        Self {
            bin: bin.to_string(),
            timeout,
        }
    }

    pub fn args(input: &Path, output: &Path, bitrate: &str) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-vn".to_string(),
            "-acodec".to_string(),
            AUDIO_CODEC.to_string(),
            "-b:a".to_string(),
            bitrate.to_string(),
            output.display().to_string(),
        ]
    }

    /// Extracts the audio track of `input` into an MP3 at `output`.
    ///
    /// The process is killed if it outlives the configured timeout.
    pub async fn encode(&self, input: &Path, output: &Path, bitrate: &str) -> Result<(), EncodeError> {
        info!("Running {} at {} on {}", self.bin, bitrate, input.display());

        let child = Command::new(&self.bin)
            .args(Self::args(input, output, bitrate))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    error!("Encoder binary {} not found", self.bin);
                    EncodeError::MissingBinary(self.bin.clone())
                }
                _ => EncodeError::Io(e),
            })?;

        let output_result = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                // Dropping the wait future drops the child, which kills it.
                warn!("Encoder exceeded {:?}, killed", self.timeout);
                return Err(EncodeError::TimedOut(self.timeout));
            }
        };

        let stderr = String::from_utf8_lossy(&output_result.stderr);
        if !output_result.status.success() {
            error!("Encoder failed with {}", output_result.status);
            return Err(EncodeError::Failed {
                details: tail_chars(&stderr, DIAGNOSTIC_TAIL_CHARS).to_string(),
            });
        }

        if !tokio::fs::try_exists(output).await.unwrap_or(false) {
            error!("Encoder exited cleanly but produced no {}", output.display());
            return Err(EncodeError::Failed {
                details: tail_chars(&stderr, DIAGNOSTIC_TAIL_CHARS).to_string(),
            });
        }

        Ok(())
    }
}

/// Last `max` characters of `text`.
pub fn tail_chars(text: &str, max: usize) -> &str {
    let count = text.chars().count();
    if count <= max {
        return text;
    }
    match text.char_indices().nth(count - max) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}
