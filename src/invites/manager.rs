use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use super::{CodeGenerator, InviteError};
use crate::models::invite::format_timestamp;
use crate::models::{InviteRecord, normalize_code, normalize_email, storage_key};
use crate::store::KvStore;

pub const DEFAULT_TTL_HOURS: i64 = 24;
pub const MIN_TTL_HOURS: i64 = 1;
pub const MAX_TTL_HOURS: i64 = 168;

// A consume only loses its compare-and-swap to a concurrent writer.
const CONSUME_ATTEMPTS: usize = 3;

/// Fields supplied by whoever sends the invitation.
#[derive(Debug, Clone, Default)]
pub struct NewInvite {
    pub name: String,
    pub role: String,
    pub company: String,
    pub invited_by: String,
    pub contractor: String,
    pub team: String,
    pub ttl_hours: Option<f64>,
}

/// Whole hours in `[MIN_TTL_HOURS, MAX_TTL_HOURS]`, `DEFAULT_TTL_HOURS` when
/// absent or not finite.
pub fn clamp_ttl_hours(raw: Option<f64>) -> i64 {
    match raw {
        Some(hours) if hours.is_finite() => {
            (hours.floor() as i64).clamp(MIN_TTL_HOURS, MAX_TTL_HOURS)
        }
        _ => DEFAULT_TTL_HOURS,
    }
}

/// Whether `record` can still be redeemed at `now`.
pub fn check_usable(record: &InviteRecord, now: DateTime<Utc>) -> Result<(), InviteError> {
    if record.used {
        return Err(InviteError::AlreadyUsed);
    }
    match record.expires_at() {
        Some(expires_at) if now < expires_at => Ok(()),
        _ => Err(InviteError::Expired),
    }
}

#[derive(Clone)]
pub struct InviteManager {
    store: Arc<dyn KvStore>,
    generator: CodeGenerator,
}

impl InviteManager {
    pub fn new(store: Arc<dyn KvStore>, generator: CodeGenerator) -> Self {
        Self { store, generator }
    }

    pub async fn create(&self, identity: &str, invite: NewInvite) -> Result<InviteRecord, InviteError> {
        let identity = normalize_email(identity);
        if !identity.contains('@') {
            return Err(InviteError::Validation("A valid email address is required.".into()));
        }

        let name = invite.name.trim();
        let role = invite.role.trim();
        let company = invite.company.trim();
        if name.is_empty() || role.is_empty() || company.is_empty() {
            return Err(InviteError::Validation("Name, role and company are required.".into()));
        }

        let ttl_hours = clamp_ttl_hours(invite.ttl_hours);

        for _ in 0..self.generator.max_attempts() {
            let code = self.generator.generate(self.store.as_ref(), &identity).await?;
            let now = Utc::now();
            let record = InviteRecord {
                code,
                email: identity.clone(),
                name: name.to_string(),
                role: role.to_string(),
                company: company.to_string(),
                invited_by: invite.invited_by.trim().to_string(),
                contractor: invite.contractor.trim().to_string(),
                team: invite.team.trim().to_string(),
                created_at: format_timestamp(now),
                expires_at: format_timestamp(now + Duration::hours(ttl_hours)),
                used: false,
            };

            let value = serde_json::to_string(&record)?;
            if self.store.insert_if_absent(&record.key(), &value).await? {
                tracing::info!(identity = %record.email, code = %record.code, ttl_hours, "invite created");
                return Ok(record);
            }
            tracing::debug!(identity = %record.email, code = %record.code, "invite key taken before insert");
        }

        Err(InviteError::GenerationExhausted)
    }

    pub async fn lookup(&self, identity: &str, code: &str) -> Result<InviteRecord, InviteError> {
        let (record, _) = self.load(&storage_key(&normalize_email(identity), &normalize_code(code))).await?;
        Ok(record)
    }

    pub async fn validate(&self, identity: &str, code: &str) -> Result<InviteRecord, InviteError> {
        let record = self.lookup(identity, code).await?;
        if let Err(e) = check_usable(&record, Utc::now()) {
            tracing::debug!(identity = %record.email, code = %record.code, "invite rejected: {e}");
            return Err(e);
        }
        tracing::info!(identity = %record.email, code = %record.code, "invite validated");
        Ok(record)
    }

    pub async fn consume(&self, identity: &str, code: &str) -> Result<InviteRecord, InviteError> {
        let key = storage_key(&normalize_email(identity), &normalize_code(code));

        for _ in 0..CONSUME_ATTEMPTS {
            let (record, raw) = self.load(&key).await?;
            if let Err(e) = check_usable(&record, Utc::now()) {
                tracing::debug!(identity = %record.email, code = %record.code, "invite rejected: {e}");
                return Err(e);
            }

            let consumed = InviteRecord { used: true, ..record };
            let value = serde_json::to_string(&consumed)?;
            if self.store.replace_if(&key, &raw, &value).await? {
                tracing::info!(identity = %consumed.email, code = %consumed.code, "invite consumed");
                return Ok(consumed);
            }
            tracing::debug!(%key, "invite changed during consume, re-reading");
        }

        Err(InviteError::AlreadyUsed)
    }

    /// Sanitized record plus the raw stored text it came from.
    async fn load(&self, key: &str) -> Result<(InviteRecord, String), InviteError> {
        let raw = self.store.get(key).await?.ok_or(InviteError::NotFound)?;
        let value: Value = serde_json::from_str(&raw)?;
        Ok((InviteRecord::from_stored(&value), raw))
    }
}
