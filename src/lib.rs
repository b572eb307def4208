//! Session tokens and login payloads for the to-do service.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod password;
pub mod telemetry;

pub use auth::{get_token_from_request, validator, AuthenticatedUser, JwtUtil, BEARER_PREFIX};
pub use config::AuthConfig;
pub use error::{AuthError, ConfigError, TokenError};
pub use models::{Claims, LoginRequest, UserRole};
