use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("JWT secret is not valid base64: {0}")]
    SecretEncoding(#[from] base64::DecodeError),
    #[error("JWT secret must be at least {minimum} bytes, got {actual}")]
    SecretTooShort { actual: usize, minimum: usize },
    #[error("{name} must be a positive number of seconds, got {value:?}")]
    InvalidTtl { name: &'static str, value: String },
}

/// Why a token was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Invalid JWT signature")]
    InvalidSignature,
    #[error("Malformed JWT token")]
    Malformed,
    #[error("Expired JWT token")]
    Expired,
    #[error("Unsupported JWT token")]
    Unsupported,
    #[error("JWT claims is empty")]
    EmptyClaims,
    #[error("Failed to sign JWT token: {0}")]
    Signing(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error(transparent)]
    InvalidToken(#[from] TokenError),
    #[error("Invalid login request: {0}")]
    InvalidRequest(String),
    #[error("Password hashing failed: {0}")]
    Password(#[from] bcrypt::BcryptError),
    #[error("Token verification is not configured")]
    NotConfigured,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Password(_) | AuthError::NotConfigured => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AuthError::Password(_) | AuthError::NotConfigured => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_problems_map_to_unauthorized() {
        assert_eq!(AuthError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::from(TokenError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidRequest("username".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn invalid_token_keeps_category_message() {
        let err = AuthError::from(TokenError::Expired);
        assert_eq!(err.to_string(), "Expired JWT token");
    }
}
