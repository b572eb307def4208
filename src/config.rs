use crate::error::ConfigError;
use std::env;

pub const SECRET_ENV: &str = "JWT_SECRET_KEY";
pub const TTL_ENV: &str = "JWT_TOKEN_TTL_SECS";

/// One hour, in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Thirty days.
pub const MAX_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Clone)]
pub struct AuthConfig {
    /// Base64 encoded HMAC secret
    pub secret_key: String,
    pub token_ttl_secs: i64,
}

impl AuthConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }

    /// Reads `JWT_SECRET_KEY` and `JWT_TOKEN_TTL_SECS`, picking up a `.env` file if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let secret_key = env::var(SECRET_ENV).map_err(|_| ConfigError::Missing(SECRET_ENV))?;
        let token_ttl_secs = match env::var(TTL_ENV) {
            Ok(raw) => parse_ttl(&raw)?,
            Err(_) => DEFAULT_TOKEN_TTL_SECS,
        };

        Ok(Self {
            secret_key,
            token_ttl_secs,
        })
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

fn parse_ttl(raw: &str) -> Result<i64, ConfigError> {
    match raw.trim().parse::<i64>() {
        Ok(secs) if secs > 0 && secs <= MAX_TOKEN_TTL_SECS => Ok(secs),
        _ => Err(ConfigError::InvalidTtl {
            name: TTL_ENV,
            value: raw.to_string(),
        }),
    }
}
