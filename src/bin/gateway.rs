//! Serverless entry point: reads one gateway event as JSON on stdin and
//! writes the reply as JSON on stdout.

use anyhow::Context;
use dotenvy::dotenv;
use mp3_converter::{
    app,
    config::{logging, settings::AppConfig},
    gateway::{self, GatewayEvent},
    state::AppState,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logging::init_tracing();

    let mut raw = String::new();
    tokio::io::stdin()
        .read_to_string(&mut raw)
        .await
        .context("Failed to read event from stdin")?;
    let event: GatewayEvent = serde_json::from_str(&raw).context("Event is not valid JSON")?;

    let router = app::create_app(AppState::new(AppConfig::new()));
    let reply = gateway::handle(event, &router).await?;
    info!("Replying {}", reply.status_code);

    let mut out = serde_json::to_vec(&reply)?;
    out.push(b'\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&out).await?;
    stdout.flush().await?;
    Ok(())
}
