//! Forwards user invitations to the identity provider's admin API.

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Admin endpoints, tried in order. Later ones are only used when the
/// previous one answers 404.
pub const INVITE_ENDPOINTS: [&str; 2] = [
    "/.netlify/identity/admin/invite",
    "/.netlify/identity/admin/invitations",
];

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteData {
    pub name: String,
    pub role: String,
    pub company: String,
    pub contractor: String,
    pub team: String,
    pub invited_by: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentityInvite {
    pub email: String,
    pub data: InviteData,
}

#[derive(Clone)]
pub struct IdentityAdmin {
    client: reqwest::Client,
    site_url: String,
    admin_token: String,
}

impl IdentityAdmin {
    pub fn new(site_url: &str, admin_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            site_url: site_url.trim_end_matches('/').to_string(),
            admin_token: admin_token.into(),
        }
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub async fn invite(&self, invite: &IdentityInvite) -> Result<(), IdentityError> {
        let mut last = (StatusCode::INTERNAL_SERVER_ERROR, String::new());

        for path in INVITE_ENDPOINTS {
            let response = self
                .client
                .post(format!("{}{}", self.site_url, path))
                .bearer_auth(&self.admin_token)
                .json(invite)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;
            if status.is_success() {
                tracing::info!(email = %invite.email, path, "identity invite sent");
                return Ok(());
            }

            tracing::debug!(%status, path, "identity invite endpoint refused");
            last = (status, body);
            if status != StatusCode::NOT_FOUND {
                break;
            }
        }

        let (status, body) = last;
        Err(IdentityError::Rejected {
            status,
            message: rejection_message(&body),
        })
    }
}

fn rejection_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        for field in ["error_description", "error", "message"] {
            if let Some(Value::String(message)) = parsed.get(field) {
                if !message.is_empty() {
                    return message.clone();
                }
            }
        }
        return "Sending the invitation failed.".to_string();
    }
    if body.trim().is_empty() {
        "Sending the invitation failed.".to_string()
    } else {
        body.to_string()
    }
}
