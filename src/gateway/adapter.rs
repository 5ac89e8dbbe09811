use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine};
use futures_util::StreamExt;
use tracing::{info, warn};

use super::error::AdapterError;
use super::event::{GatewayEvent, GatewayReply};
use super::handler::{HandlerResponse, RequestHandler};
use super::request::translate_event;

const DEFAULT_STATUS: u16 = 200;

/// Runs one gateway event through `handler` and builds the reply.
///
/// Handler errors are returned as-is; the adapter never turns them into a reply.
pub async fn handle<H>(event: GatewayEvent, handler: &H) -> Result<GatewayReply, AdapterError>
where
    H: RequestHandler + ?Sized,
{
    let request = translate_event(event)?;
    info!("Gateway {} {}", request.method(), request.uri());

    let HandlerResponse {
        status,
        headers,
        mut body,
    } = handler.call(request).await?;

    let mut buf: Vec<u8> = Vec::new();
    while let Some(chunk) = body.next().await {
        buf.extend_from_slice(&chunk?.into_bytes());
    }
    drop(body);

    Ok(GatewayReply {
        status_code: parse_status(status.as_deref()),
        headers: merge_headers(headers),
        body: STANDARD.encode(&buf),
        encoding: "base64".to_string(),
    })
}

/// Numeric code of a status line such as `"201 Created"`.
pub fn parse_status(line: Option<&str>) -> u16 {
    let Some(line) = line else {
        return DEFAULT_STATUS;
    };
    match line.split_whitespace().next().map(str::parse::<u16>) {
        Some(Ok(code)) => code,
        _ => {
            warn!("Unparseable status line {:?}, replying {}", line, DEFAULT_STATUS);
            DEFAULT_STATUS
        }
    }
}

/// Folds a header list into a map, joining repeated names with `", "` in arrival order.
pub fn merge_headers(headers: Vec<(String, String)>) -> BTreeMap<String, String> {
    let mut merged: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        merged
            .entry(canonical_name(&name))
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    merged
}

/// `content-type` -> `Content-Type`.
pub fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
