use anyhow::{anyhow, Result};
use axum::{body::Bytes, extract::multipart::Field};
use std::path::{Path, PathBuf};
use tokio::{
    fs::File,
    io::{AsyncWriteExt, BufWriter},
};
use tracing::{debug, error};

const WRITE_BUFFER_SIZE: usize = 1024 * 1024;

pub struct FileUploader {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
}

impl FileUploader {
    pub async fn new(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .await
            .map_err(|e| anyhow!("Failed to create {}: {}", path.display(), e))?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::with_capacity(WRITE_BUFFER_SIZE, file),
            written: 0,
        })
    }

    pub async fn write_chunk(&mut self, chunk: Bytes) -> Result<()> {
        self.writer
            .write_all(&chunk)
            .await
            .map_err(|e| anyhow!("Failed to write upload chunk: {}", e))?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    pub async fn finish(mut self) -> Result<u64> {
        self.writer
            .flush()
            .await
            .map_err(|e| anyhow!("Failed to flush upload: {}", e))?;
        debug!("Saved {} bytes to {}", self.written, self.path.display());
        Ok(self.written)
    }

    pub async fn abort(self) {
        drop(self.writer);
        let _ = tokio::fs::remove_file(&self.path).await;
    }
}

/// Streams a multipart file field to `path` without buffering it in memory.
///
/// Returns the number of bytes written. A partially written file is removed
/// when the stream breaks.
pub async fn stream_to_file(mut field: Field<'_>, path: &Path) -> Result<u64> {
    let mut uploader = FileUploader::new(path).await?;

    loop {
        let chunk = match field.chunk().await {
            Ok(Some(c)) => c,
            Ok(None) => break,
            Err(e) => {
                error!("Stream error: {}", e);
                uploader.abort().await;
                return Err(e.into());
            }
        };

        if let Err(e) = uploader.write_chunk(chunk).await {
            error!("Upload error: {}", e);
            uploader.abort().await;
            return Err(e);
        }
    }

    uploader.finish().await
}
