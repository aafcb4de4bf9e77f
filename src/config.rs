use std::net::SocketAddr;

use thiserror::Error;

use crate::invites::code::{DEFAULT_CODE_LENGTH, DEFAULT_MAX_ATTEMPTS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("BIND_ADDR is not a socket address: '{0}'")]
    InvalidAddr(String),
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_key: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub site_url: String,
    pub admin_token: String,
}

/// Process configuration, read once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub code_length: usize,
    pub code_attempts: usize,
    pub mail: Option<MailConfig>,
    pub identity: Option<IdentityConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/invites.db".to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            code_length: DEFAULT_CODE_LENGTH,
            code_attempts: DEFAULT_MAX_ATTEMPTS,
            mail: None,
            identity: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Config::default();

        let bind_addr = match var("BIND_ADDR") {
            Some(addr) => addr.parse().map_err(|_| ConfigError::InvalidAddr(addr))?,
            None => defaults.bind_addr,
        };

        let mail = match (var("RESEND_API_KEY"), var("RESEND_FROM_EMAIL")) {
            (Some(api_key), Some(from)) => Some(MailConfig { api_key, from }),
            _ => None,
        };

        let identity = match (var("IDENTITY_SITE_URL"), var("IDENTITY_ADMIN_TOKEN")) {
            (Some(site_url), Some(admin_token)) => Some(IdentityConfig { site_url, admin_token }),
            _ => None,
        };

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr,
            code_length: positive(var("INVITE_CODE_LENGTH"), "INVITE_CODE_LENGTH", defaults.code_length)?,
            code_attempts: positive(var("INVITE_CODE_ATTEMPTS"), "INVITE_CODE_ATTEMPTS", defaults.code_attempts)?,
            mail,
            identity,
        })
    }
}

fn positive(value: Option<String>, name: &'static str, default: usize) -> Result<usize, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::InvalidNumber { name, value }),
        },
    }
}
