use axum::{
    body::Bytes,
    extract::State,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use super::{field, method_not_allowed, parse_body};
use crate::error::AppError;
use crate::identity::{IdentityInvite, InviteData};
use crate::models::normalize_email;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/send-invite", post(send_invite).fallback(method_not_allowed))
}

async fn send_invite(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, AppError> {
    let Some(admin) = &state.identity else {
        return Err(AppError::Misconfigured(
            "Server configuration missing. Set IDENTITY_SITE_URL and IDENTITY_ADMIN_TOKEN.",
        ));
    };

    let payload = parse_body(&body)?;

    let email = normalize_email(&field(&payload, "email"));
    let name = field(&payload, "name");
    let role = field(&payload, "role");

    if !email.contains('@') {
        return Err(AppError::Validation("A valid email address is required.".into()));
    }
    if name.is_empty() {
        return Err(AppError::Validation("Name is required.".into()));
    }
    if role.is_empty() {
        return Err(AppError::Validation("Role is required.".into()));
    }

    let invite = IdentityInvite {
        email,
        data: InviteData {
            name,
            role,
            company: field(&payload, "company"),
            contractor: field(&payload, "contractor"),
            team: field(&payload, "team"),
            invited_by: field(&payload, "invitedBy"),
        },
    };
    admin.invite(&invite).await?;

    Ok(Json(json!({ "ok": true, "message": "Invitation sent." })))
}
