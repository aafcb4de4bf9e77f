use axum::{
    body::Bytes,
    extract::State,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use super::{field, method_not_allowed, parse_body, Payload};
use crate::error::AppError;
use crate::invites::NewInvite;
use crate::models::{normalize_code, normalize_email, InviteRecord};
use crate::notify::Mail;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Create,
    Validate,
    Consume,
}

impl Action {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(Action::Create),
            "validate" => Some(Action::Validate),
            "consume" => Some(Action::Consume),
            _ => None,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/invite-code", post(invite_code).fallback(method_not_allowed))
}

/// `ttlHours` as a number. Text that is not a number becomes NaN so it falls
/// back to the default TTL.
fn ttl_hours(value: Option<&Value>) -> Option<f64> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.trim().parse().unwrap_or(f64::NAN)),
        Some(_) => Some(f64::NAN),
    }
}

fn new_invite(payload: &Payload) -> NewInvite {
    NewInvite {
        name: field(payload, "name"),
        role: field(payload, "role"),
        company: field(payload, "company"),
        invited_by: field(payload, "invitedBy"),
        contractor: field(payload, "contractor"),
        team: field(payload, "team"),
        ttl_hours: ttl_hours(payload.get("ttlHours")),
    }
}

async fn invite_code(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, AppError> {
    let payload = parse_body(&body)?;

    let action = field(&payload, "action");
    if action.is_empty() {
        return Err(AppError::Validation("Action is required.".into()));
    }
    let action = Action::parse(&action).ok_or_else(|| {
        AppError::Validation("Unknown action. Use create, validate or consume.".into())
    })?;

    let email = normalize_email(&field(&payload, "email"));
    if !email.contains('@') {
        return Err(AppError::Validation("A valid email address is required.".into()));
    }

    let invite: InviteRecord = match action {
        Action::Create => {
            let record = state.invites.create(&email, new_invite(&payload)).await?;
            if let Err(e) = state.notifier.send(&Mail::invite_code(&record)).await {
                tracing::warn!(email = %record.email, "invite created but mail failed: {e}");
            }
            record
        }
        Action::Validate | Action::Consume => {
            let code = normalize_code(&field(&payload, "code"));
            if code.is_empty() {
                return Err(AppError::Validation("Code is required.".into()));
            }
            if action == Action::Validate {
                state.invites.validate(&email, &code).await?
            } else {
                state.invites.consume(&email, &code).await?
            }
        }
    };

    Ok(Json(json!({ "ok": true, "invite": invite })))
}
