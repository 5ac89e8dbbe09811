#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use mp3_converter::{app::create_app, config::settings::AppConfig, state::AppState};
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "----mp3converterboundary";

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        data: &'a [u8],
    },
    /// A part named like a file but carrying no `filename` attribute.
    Bare(&'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", name, value).as_bytes(),
                );
            }
            Part::File { name, filename, data } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
            Part::Bare(name, data) => {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes());
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

pub fn convert_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/convert")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// A router whose work dirs land in a private directory.
pub struct TestApp {
    pub router: Router,
    pub upload_dir: TempDir,
    pub scripts: TempDir,
}

impl TestApp {
    pub fn new(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let scripts = tempfile::tempdir().unwrap();
        let mut config = AppConfig {
            upload_dir: upload_dir.path().to_path_buf(),
            encode_timeout: Duration::from_secs(30),
            ..AppConfig::default()
        };
        configure(&mut config);
        let router = create_app(AppState::new(config));
        Self {
            router,
            upload_dir,
            scripts,
        }
    }

    /// Uses a shell script as the encoder. The script body sees ffmpeg's argument list.
    #[cfg(unix)]
    pub fn with_stub_encoder(script: &str, configure: impl FnOnce(&mut AppConfig)) -> Self {
        let scripts = tempfile::tempdir().unwrap();
        let path = write_script(scripts.path(), script);
        let upload_dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig {
            upload_dir: upload_dir.path().to_path_buf(),
            ffmpeg_bin: path.display().to_string(),
            encode_timeout: Duration::from_secs(30),
            ..AppConfig::default()
        };
        configure(&mut config);
        let router = create_app(AppState::new(config));
        Self {
            router,
            upload_dir,
            scripts,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub fn work_dirs(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.upload_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    /// Work dirs still present once pending background removals have run.
    pub async fn settled_work_dirs(&self) -> Vec<PathBuf> {
        for _ in 0..250 {
            if self.work_dirs().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.work_dirs()
    }

    pub fn recorded_args(&self) -> String {
        std::fs::read_to_string(self.scripts.path().join("args.txt")).unwrap_or_default()
    }
}

#[cfg(unix)]
fn write_script(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-ffmpeg");
    let script = format!(
        "#!/bin/sh\necho \"$@\" > \"{}\"\n{}\n",
        dir.join("args.txt").display(),
        body
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Copies the input (third argument) to the output (last argument).
pub const COPY_SCRIPT: &str = "for last; do :; done\ncp \"$3\" \"$last\"";

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
