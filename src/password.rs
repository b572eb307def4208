use crate::error::AuthError;
use bcrypt::{hash, verify, DEFAULT_COST};

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(hash(password, cost)?)
}

/// A hash that bcrypt cannot parse is reported as an error, not as a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AuthError> {
    Ok(verify(password, password_hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hashed = hash_password_with_cost("s3cret", 4).unwrap();
        assert_ne!(hashed, "s3cret");
        assert!(verify_password("s3cret", &hashed).unwrap());
        assert!(!verify_password("S3cret", &hashed).unwrap());
    }

    #[test]
    fn default_cost_hash_is_verifiable() {
        let hashed = hash_password("s3cret").unwrap();
        assert!(hashed.starts_with("$2"));
        assert!(verify_password("s3cret", &hashed).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(matches!(
            verify_password("s3cret", "not-a-bcrypt-hash"),
            Err(AuthError::Password(_))
        ));
    }
}
