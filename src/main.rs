use dotenvy::dotenv;
use mp3_converter::{app, config::logging, config::settings::AppConfig, state::AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    logging::init_tracing();

    info!("Starting server...");

    let config = AppConfig::new();
    let addr = format!("0.0.0.0:{}", config.server_port);
    info!(
        "Encoder: {} (timeout {:?}), uploads in {}",
        config.ffmpeg_bin,
        config.encode_timeout,
        config.upload_dir.display()
    );

    let app = app::create_app(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
