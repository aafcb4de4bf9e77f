pub mod identity;
pub mod invite_code;
pub mod mail;

use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::invite::coerce_string;

pub type Payload = Map<String, Value>;

/// Parse a JSON object body. An empty body counts as `{}`.
pub(crate) fn parse_body(body: &[u8]) -> Result<Payload, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(AppError::MalformedRequest),
    }
}

/// Trimmed text of a payload field, empty when missing.
pub(crate) fn field(payload: &Payload, name: &str) -> String {
    payload
        .get(name)
        .map(|v| coerce_string(v).trim().to_string())
        .unwrap_or_default()
}

pub(crate) async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
