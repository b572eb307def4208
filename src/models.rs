use crate::error::AuthError;
use crate::password;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::fmt;

/// Credentials posted by a client that wants a session token.
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(min_length = 1)]
    #[validate(pattern = r"\S")]
    pub username: String,
    #[validate(min_length = 1)]
    #[validate(pattern = r"\S")]
    pub password: String,
}

impl LoginRequest {
    /// Runs field validation and turns a failure into a 400-class error.
    pub fn check(&self) -> Result<(), AuthError> {
        self.validate().map_err(|errors| {
            tracing::warn!("Rejected login request for {:?}: {}", self.username, errors);
            AuthError::InvalidRequest(errors.to_string())
        })
    }

    /// Compares the supplied password with a stored bcrypt hash.
    pub fn verify_password(&self, password_hash: &str) -> Result<bool, AuthError> {
        password::verify_password(&self.password, password_hash)
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn authority(&self) -> &'static str {
        match self {
            UserRole::User => "ROLE_USER",
            UserRole::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::User => write!(f, "USER"),
            UserRole::Admin => write!(f, "ADMIN"),
        }
    }
}

/// Claim set carried inside every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the token holder
    pub sub: String,
    /// Role granted at login
    pub auth: UserRole,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn accepts_filled_in_credentials() {
        assert!(request("alice", "hunter2").validate().is_ok());
        assert!(request("alice", "hunter2").check().is_ok());
    }

    #[test]
    fn rejects_empty_username() {
        assert!(request("", "hunter2").validate().is_err());
    }

    #[test]
    fn rejects_empty_password() {
        assert!(request("alice", "").validate().is_err());
    }

    #[test]
    fn rejects_blank_fields() {
        assert!(request("   ", "hunter2").validate().is_err());
        assert!(matches!(
            request("alice", "\t\n").check(),
            Err(AuthError::InvalidRequest(_))
        ));
    }

    #[test]
    fn missing_field_fails_deserialization() {
        let parsed = serde_json::from_str::<LoginRequest>(r#"{"username":"alice"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", request("alice", "hunter2"));
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn verifies_password_against_hash() {
        let hash = password::hash_password_with_cost("hunter2", 4).unwrap();
        assert!(request("alice", "hunter2").verify_password(&hash).unwrap());
        assert!(!request("alice", "wrong").verify_password(&hash).unwrap());
    }

    #[test]
    fn role_serializes_in_upper_case() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"ADMIN\"");
        let role: UserRole = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, UserRole::User);
        assert_eq!(role.authority(), "ROLE_USER");
    }
}
