use crate::config::{AuthConfig, MAX_TOKEN_TTL_SECS, TTL_ENV};
use crate::error::{AuthError, ConfigError, TokenError};
use crate::models::{Claims, UserRole};
use actix_web::dev::{Payload, ServiceRequest};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use base64::{engine::general_purpose::STANDARD, Engine};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::future::{ready, Ready};

pub const BEARER_PREFIX: &str = "Bearer ";

/// HS256 needs at least 256 bits of key material.
pub const MIN_SECRET_BYTES: usize = 32;

/// Issues and checks HS256 session tokens with a single shared secret.
#[derive(Clone)]
pub struct JwtUtil {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl_secs: i64,
}

impl JwtUtil {
    /// `secret` is the base64 encoded signing key.
    pub fn new(secret: &str) -> Result<Self, ConfigError> {
        Self::from_config(&AuthConfig::new(secret))
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        let key = STANDARD.decode(config.secret_key.trim())?;
        if key.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::SecretTooShort {
                actual: key.len(),
                minimum: MIN_SECRET_BYTES,
            });
        }

        let token_ttl_secs = check_ttl(config.token_ttl_secs)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&key),
            decoding_key: DecodingKey::from_secret(&key),
            validation,
            token_ttl_secs,
        })
    }

    /// Signs a token for `username` and returns it with the `Bearer ` prefix attached.
    pub fn create_token(&self, username: &str, role: UserRole) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_owned(),
            auth: role,
            iat: now,
            exp: now
                .checked_add(self.token_ttl_secs)
                .ok_or_else(|| TokenError::Signing("token expiry overflows".to_string()))?,
        };

        let token = self.encode_claims(&claims)?;
        Ok(format!("{BEARER_PREFIX}{token}"))
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Checks signature and expiry. Failures are logged and reported as `false`.
    pub fn validate_token(&self, token: &str) -> bool {
        match self.verify_token(token) {
            Ok(_) => true,
            Err(err) => {
                match err {
                    TokenError::InvalidSignature | TokenError::Malformed => {
                        tracing::error!("Invalid JWT signature: {}", err)
                    }
                    TokenError::Expired => tracing::error!("Expired JWT token"),
                    TokenError::Unsupported => tracing::error!("Unsupported JWT token"),
                    TokenError::EmptyClaims => tracing::error!("JWT claims is empty"),
                    TokenError::Signing(_) => tracing::error!("{}", err),
                }
                false
            }
        }
    }

    /// Parses and verifies a token in one step. A leading `Bearer ` is tolerated.
    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        let token = token.strip_prefix(BEARER_PREFIX).unwrap_or(token).trim();
        if token.is_empty() {
            return Err(TokenError::EmptyClaims);
        }

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| classify(err.kind()))
    }

    /// Returns the claims of a token. Any verification failure is handed back to the caller.
    pub fn get_user_info_from_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_token(token)
    }

    pub fn token_ttl_secs(&self) -> i64 {
        self.token_ttl_secs
    }
}

fn check_ttl(ttl: i64) -> Result<i64, ConfigError> {
    if ttl > 0 && ttl <= MAX_TOKEN_TTL_SECS {
        Ok(ttl)
    } else {
        Err(ConfigError::InvalidTtl {
            name: TTL_ENV,
            value: ttl.to_string(),
        })
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm
        | ErrorKind::InvalidKeyFormat => TokenError::Unsupported,
        ErrorKind::MissingRequiredClaim(_) => TokenError::EmptyClaims,
        _ => TokenError::Malformed,
    }
}

/// Pulls the raw token out of an `Authorization` header value.
pub fn token_from_header(header: Option<&str>) -> Option<&str> {
    header
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.trim().is_empty())
}

pub fn get_token_from_request(req: &HttpRequest) -> Option<&str> {
    tracing::debug!("Reading bearer token from request");
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    token_from_header(header)
}

/// Bearer validator for `HttpAuthentication::bearer`; verified claims go into the request extensions.
pub async fn validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(jwt) = req.app_data::<web::Data<JwtUtil>>().cloned() else {
        tracing::error!("JwtUtil is not registered as application data");
        return Err((AuthError::NotConfigured.into(), req));
    };

    match jwt.verify_token(credentials.token()) {
        Ok(claims) => {
            tracing::debug!("Authenticated {} as {}", claims.sub, claims.auth);
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Err(err) => {
            tracing::warn!("Rejected bearer token: {}", err);
            Err((AuthError::from(err).into(), req))
        }
    }
}

/// Claims of the caller, taken from the bearer token of the current request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    pub fn username(&self) -> &str {
        &self.0.sub
    }

    pub fn role(&self) -> UserRole {
        self.0.auth
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AuthError> {
    // Already verified by `validator` further up the chain.
    if let Some(claims) = req.extensions().get::<Claims>() {
        return Ok(AuthenticatedUser(claims.clone()));
    }

    let jwt = req
        .app_data::<web::Data<JwtUtil>>()
        .ok_or(AuthError::NotConfigured)?;
    let token = get_token_from_request(req).ok_or(AuthError::MissingToken)?;
    let claims = jwt.verify_token(token)?;
    Ok(AuthenticatedUser(claims))
}
