use serde::Serialize;
use serde_json::Value;

use super::{Mail, MailError, Notifier};

pub const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Delivers mail through the Resend HTTP API.
pub struct ResendMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: RESEND_ENDPOINT.to_string(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait::async_trait]
impl Notifier for ResendMailer {
    fn enabled(&self) -> bool {
        true
    }

    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        let rendered = mail.render()?;
        let request = SendRequest {
            from: &self.from,
            to: [&rendered.to],
            subject: rendered.subject,
            html: &rendered.html,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(%status, to = %rendered.to, "mail provider rejected message");
            return Err(MailError::Rejected(rejection_message(&body)));
        }

        tracing::info!(to = %rendered.to, kind = ?mail.kind, "mail sent");
        Ok(())
    }
}

/// Best human-readable message from a provider error body.
fn rejection_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        for field in ["message", "error"] {
            if let Some(Value::String(message)) = parsed.get(field) {
                if !message.is_empty() {
                    return message.clone();
                }
            }
        }
        return "Sending mail failed.".to_string();
    }
    if body.trim().is_empty() {
        "Sending mail failed.".to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_prefers_json_fields() {
        assert_eq!(rejection_message(r#"{"message":"bad sender"}"#), "bad sender");
        assert_eq!(rejection_message(r#"{"error":"quota"}"#), "quota");
        assert_eq!(rejection_message(r#"{"other":1}"#), "Sending mail failed.");
        assert_eq!(rejection_message(r#"{"message":"","error":"quota"}"#), "quota");
        assert_eq!(rejection_message(r#"{"message":""}"#), "Sending mail failed.");
        assert_eq!(rejection_message("gateway down"), "gateway down");
        assert_eq!(rejection_message("  "), "Sending mail failed.");
    }
}
