use std::sync::Arc;

use crate::config::settings::AppConfig;
use crate::infrastructure::ffmpeg::Encoder;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub encoder: Encoder,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let encoder = Encoder::new(&config.ffmpeg_bin, config.encode_timeout);

        Self {
            config: Arc::new(config),
            encoder,
        }
    }
}
