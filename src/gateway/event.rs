use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Invocation payload as delivered by the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    pub method: Option<String>,
    pub http_method: Option<String>,
    pub path: Option<String>,
    pub query_string: Option<String>,
    pub query_string_parameters: Option<Map<String, Value>>,
    pub headers: Option<Map<String, Value>>,
    pub body: Option<EventBody>,
    pub encoding: Option<String>,
    pub is_base64_encoded: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventBody {
    Text(String),
    Bytes(Vec<u8>),
}

impl GatewayEvent {
    pub fn body_is_base64(&self) -> bool {
        self.encoding.as_deref() == Some("base64") || self.is_base64_encoded.unwrap_or(false)
    }
}

/// Scalar JSON value as it appears in a header or query string. `null` has no text form.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayReply {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub encoding: String,
}

impl GatewayReply {
    pub fn body_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.body)
    }
}
