use axum::{
    body::Body,
    http::{header, Method, Request},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::debug;
use url::{Position, Url};

use super::error::AdapterError;
use super::event::{scalar_text, EventBody, GatewayEvent};

/// Prefix the gateway mounts the function under.
const API_PREFIX: &str = "/api";

/// Builds the request the router sees from a gateway event.
pub fn translate_event(event: GatewayEvent) -> Result<Request<Body>, AdapterError> {
    let base64_body = event.body_is_base64();

    let method = event
        .method
        .filter(|m| !m.is_empty())
        .or(event.http_method.filter(|m| !m.is_empty()))
        .map(|m| m.to_uppercase())
        .unwrap_or_else(|| Method::GET.to_string());
    let path = normalize_path(event.path.as_deref());
    let query = build_query(event.query_string.as_deref(), event.query_string_parameters.as_ref());
    let headers = lowercase_headers(event.headers.as_ref());

    let charset = headers
        .iter()
        .find(|(name, _)| name == "content-encoding")
        .map(|(_, value)| value.as_str());
    let body = decode_body(event.body, base64_body, charset)?;

    debug!("Gateway event {} {} ({} body bytes)", method, path, body.len());

    let uri = request_target(&path, &query)?;

    let mut builder = Request::builder().method(method.as_str()).uri(uri);
    let mut has_host = false;
    for (name, value) in &headers {
        if name == "content-length" {
            continue;
        }
        has_host |= name == "host";
        builder = builder.header(name.as_str(), value.as_str());
    }
    if !has_host {
        builder = builder.header(header::HOST, "localhost");
    }

    let request = builder
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))?;
    Ok(request)
}

pub fn normalize_path(path: Option<&str>) -> String {
    let path = path.filter(|p| !p.is_empty()).unwrap_or("/");
    let stripped = if path == API_PREFIX {
        "/"
    } else if path.starts_with("/api/") {
        &path[API_PREFIX.len()..]
    } else {
        path
    };

    if stripped.starts_with('/') {
        stripped.to_string()
    } else {
        format!("/{}", stripped)
    }
}

/// Origin-form target with the path and query percent-encoded, so a space,
/// `?` or `#` inside the path stays part of the path.
pub fn request_target(path: &str, query: &str) -> Result<String, AdapterError> {
    let mut url = Url::parse("http://localhost/")?;
    url.set_path(path);
    if !query.is_empty() {
        url.set_query(Some(query));
    }
    Ok(url[Position::BeforePath..].to_string())
}

/// Raw query string when given, otherwise the parameter map form-encoded in order.
/// Parameters with a `null` value are left out.
pub fn build_query(raw: Option<&str>, params: Option<&serde_json::Map<String, serde_json::Value>>) -> String {
    if let Some(raw) = raw.filter(|r| !r.is_empty()) {
        return raw.to_string();
    }
    let Some(params) = params else {
        return String::new();
    };

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        if let Some(value) = scalar_text(value) {
            serializer.append_pair(key, &value);
        }
    }
    serializer.finish()
}

/// Header names lower-cased; on a case-insensitive clash the later entry wins.
pub fn lowercase_headers(headers: Option<&serde_json::Map<String, serde_json::Value>>) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for (name, value) in headers.into_iter().flatten() {
        let Some(value) = scalar_text(value) else {
            continue;
        };
        let name = name.to_lowercase();
        match out.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => out.push((name, value)),
        }
    }
    out
}

pub fn decode_body(body: Option<EventBody>, base64: bool, charset: Option<&str>) -> Result<Vec<u8>, AdapterError> {
    match body {
        None => Ok(Vec::new()),
        Some(EventBody::Bytes(bytes)) => Ok(bytes),
        Some(EventBody::Text(text)) if base64 => Ok(STANDARD.decode(text.trim())?),
        Some(EventBody::Text(text)) => Ok(encode_text(&text, charset)),
    }
}

/// Encodes `text` in `charset`, dropping characters it cannot represent.
/// Unknown charsets are treated as UTF-8.
pub fn encode_text(text: &str, charset: Option<&str>) -> Vec<u8> {
    let charset = charset.map(|c| c.trim().to_ascii_lowercase());
    match charset.as_deref() {
        Some("ascii" | "us-ascii") => text.chars().filter(char::is_ascii).map(|c| c as u8).collect(),
        Some("latin-1" | "latin1" | "iso-8859-1" | "iso8859-1") => {
            text.chars().filter_map(|c| u8::try_from(c).ok()).collect()
        }
        _ => text.as_bytes().to_vec(),
    }
}
