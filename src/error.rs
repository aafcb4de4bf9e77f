use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::identity::IdentityError;
use crate::invites::InviteError;
use crate::notify::MailError;

#[derive(Debug)]
pub enum AppError {
    MethodNotAllowed,
    MalformedRequest,
    Validation(String),
    Invite(InviteError),
    Mail(MailError),
    Identity(IdentityError),
    Misconfigured(&'static str),
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::MethodNotAllowed => error_body(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
            AppError::MalformedRequest => error_body(StatusCode::BAD_REQUEST, "Invalid JSON body"),
            AppError::Validation(message) => error_body(StatusCode::BAD_REQUEST, message),
            AppError::Invite(e @ (InviteError::Store(_) | InviteError::Serialization(_))) => {
                tracing::error!("Invite store error: {e}");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Invite store unavailable.")
            }
            AppError::Invite(e) => {
                let status = match &e {
                    InviteError::Validation(_) => StatusCode::BAD_REQUEST,
                    InviteError::NotFound => StatusCode::NOT_FOUND,
                    InviteError::AlreadyUsed => StatusCode::CONFLICT,
                    InviteError::Expired => StatusCode::GONE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                error_body(status, e.to_string())
            }
            AppError::Mail(e) => {
                tracing::error!("Mail error: {e}");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::Identity(IdentityError::Rejected { status, message }) => error_body(status, message),
            AppError::Identity(e) => {
                tracing::error!("Identity provider error: {e}");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::Misconfigured(message) => {
                tracing::error!("Server misconfigured: {message}");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

impl From<InviteError> for AppError {
    fn from(e: InviteError) -> Self {
        AppError::Invite(e)
    }
}

impl From<MailError> for AppError {
    fn from(e: MailError) -> Self {
        AppError::Mail(e)
    }
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        AppError::Identity(e)
    }
}
