use std::sync::Arc;

use rand::Rng;

use super::InviteError;
use crate::models::storage_key;
use crate::store::KvStore;

/// Uppercase letters and digits without the easily confused 0/O and 1/I.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const DEFAULT_CODE_LENGTH: usize = 8;
pub const DEFAULT_MAX_ATTEMPTS: usize = 8;

/// Source of uniformly distributed indices.
pub trait RandomSource: Send + Sync {
    /// A value in `0..upper`.
    fn index(&self, upper: usize) -> usize;
}

pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, upper: usize) -> usize {
        rand::thread_rng().gen_range(0..upper)
    }
}

#[derive(Clone)]
pub struct CodeGenerator {
    random: Arc<dyn RandomSource>,
    length: usize,
    max_attempts: usize,
}

impl CodeGenerator {
    pub fn new(random: Arc<dyn RandomSource>, length: usize, max_attempts: usize) -> Self {
        Self {
            random,
            length: length.max(1),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn draw(&self) -> String {
        (0..self.length)
            .map(|_| CODE_ALPHABET[self.random.index(CODE_ALPHABET.len())] as char)
            .collect()
    }

    /// Pick a code with no record under `identity` yet.
    pub async fn generate(&self, store: &dyn KvStore, identity: &str) -> Result<String, InviteError> {
        for attempt in 1..=self.max_attempts {
            let code = self.draw();
            if store.get(&storage_key(identity, &code)).await?.is_none() {
                return Ok(code);
            }
            tracing::debug!(identity, attempt, "invite code collision");
        }

        tracing::warn!(identity, attempts = self.max_attempts, "invite code generation exhausted");
        Err(InviteError::GenerationExhausted)
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom), DEFAULT_CODE_LENGTH, DEFAULT_MAX_ATTEMPTS)
    }
}
