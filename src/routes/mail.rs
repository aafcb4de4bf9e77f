use axum::{
    body::Bytes,
    extract::State,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use super::{field, method_not_allowed, parse_body};
use crate::error::AppError;
use crate::models::{normalize_code, normalize_email};
use crate::notify::{Mail, MailDetails, MailKind};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/send-mail", post(send_mail).fallback(method_not_allowed))
}

async fn send_mail(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, AppError> {
    if !state.notifier.enabled() {
        return Ok(Json(json!({
            "ok": true,
            "skipped": true,
            "message": "RESEND_API_KEY/RESEND_FROM_EMAIL missing; mail skipped.",
        })));
    }

    let payload = parse_body(&body)?;

    let to = normalize_email(&field(&payload, "email"));
    if !to.contains('@') {
        return Err(AppError::Validation("A valid email address is required.".into()));
    }

    let kind = MailKind::parse(&field(&payload, "type")).ok_or_else(|| {
        AppError::Validation(
            "Unknown type. Use welcome, invite_notice, invite_code or verified.".into(),
        )
    })?;

    let mail = Mail {
        kind,
        to,
        details: MailDetails {
            name: field(&payload, "name"),
            company: field(&payload, "company"),
            role: field(&payload, "role"),
            invited_by: field(&payload, "invitedBy"),
            contractor: field(&payload, "contractor"),
            team: field(&payload, "team"),
            code: normalize_code(&field(&payload, "code")),
            expires_at: field(&payload, "expiresAt"),
        },
    };
    state.notifier.send(&mail).await?;

    Ok(Json(json!({ "ok": true, "message": kind.sent_message() })))
}
