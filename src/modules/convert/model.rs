use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use uuid::Uuid;

use super::dto::Quality;

const WORKDIR_PREFIX: &str = "mp3conv_";
const OUTPUT_FILE: &str = "output.mp3";

/// Per-request scratch directory. Removed once, when dropped.
#[derive(Debug)]
pub struct WorkDir {
    dir: Option<TempDir>,
}

impl WorkDir {
    pub async fn create(parent: &Path) -> io::Result<Self> {
        tokio::fs::create_dir_all(parent).await?;
        let parent = parent.to_path_buf();
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(WORKDIR_PREFIX)
                .tempdir_in(parent)
        })
        .await
        .map_err(io::Error::other)??;
        debug!("Created work dir {}", dir.path().display());
        Ok(Self { dir: Some(dir) })
    }

    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            None => Path::new(""),
        }
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        // The recursive delete may be large; keep it off the async workers.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_dir(dir));
            }
            Err(_) => remove_dir(dir),
        }
    }
}

/// Cleanup faults never reach the client.
fn remove_dir(dir: TempDir) {
    let path = dir.path().to_path_buf();
    match dir.close() {
        Ok(()) => debug!("Removed work dir {}", path.display()),
        Err(e) => debug!("Ignoring cleanup failure for {}: {}", path.display(), e),
    }
}

/// One upload being turned into an MP3.
#[derive(Debug)]
pub struct ConversionJob {
    pub upload_name: String,
    pub quality: Quality,
    pub output_name: Option<String>,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub workdir: WorkDir,
}

impl ConversionJob {
    pub fn new(workdir: WorkDir, upload_name: String) -> Self {
        let input_path = workdir.path().join(format!("input_{}", Uuid::new_v4().simple()));
        let output_path = workdir.path().join(OUTPUT_FILE);

        Self {
            upload_name,
            quality: Quality::default(),
            output_name: None,
            input_path,
            output_path,
            workdir,
        }
    }
}
