//! Invite code lifecycle: generate, validate, consume.

pub mod code;
pub mod manager;

pub use code::{CodeGenerator, RandomSource, ThreadRandom};
pub use manager::{InviteManager, NewInvite, clamp_ttl_hours};

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum InviteError {
    #[error("{0}")]
    Validation(String),
    #[error("Code not found.")]
    NotFound,
    #[error("Code has already been used.")]
    AlreadyUsed,
    #[error("Code has expired.")]
    Expired,
    #[error("Failed to generate a code.")]
    GenerationExhausted,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invite encoding failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_error_display() {
        let e = InviteError::from(serde_json::from_str::<serde_json::Value>("{").unwrap_err());
        assert!(e.to_string().starts_with("invite encoding failed: "));
    }
}
