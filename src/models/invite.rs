use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const KEY_NAMESPACE: &str = "invite";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRecord {
    pub code: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub company: String,
    pub invited_by: String,
    pub contractor: String,
    pub team: String,
    pub created_at: String,
    pub expires_at: String,
    pub used: bool,
}

impl InviteRecord {
    /// Rebuild a record from whatever JSON the store holds. Missing or odd
    /// fields are coerced instead of rejected.
    pub fn from_stored(value: &Value) -> Self {
        let text = |field: &str| value.get(field).map(coerce_string).unwrap_or_default();

        Self {
            code: text("code"),
            email: normalize_email(&text("email")),
            name: text("name"),
            role: text("role"),
            company: text("company"),
            invited_by: text("invitedBy"),
            contractor: text("contractor"),
            team: text("team"),
            created_at: text("createdAt"),
            expires_at: text("expiresAt"),
            used: matches!(value.get("used"), Some(Value::Bool(true))),
        }
    }

    pub fn key(&self) -> String {
        storage_key(&self.email, &self.code)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.expires_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Textual form of a JSON scalar, empty for null, arrays and objects.
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn normalize_code(value: &str) -> String {
    value.trim().to_uppercase()
}

pub fn storage_key(email: &str, code: &str) -> String {
    format!("{KEY_NAMESPACE}:{email}:{code}")
}

/// ISO 8601 in UTC with millisecond precision, e.g. `2025-01-31T09:00:00.000Z`.
pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}
