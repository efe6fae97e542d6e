//! Bearer-token verification.
//!
//! Accounts and sign-in live in a separate service, which signs HS256 JWTs
//! with a shared secret. This server checks the signature and expiry and
//! reads the subject; [`generate_access_token`] mints tokens for local
//! tooling and tests.

use dashshare_core::roles::Role;
use dashshare_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_EXPIRY_MINS: i64 = 15;
const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Database id of the user.
    pub sub: DbId,
    /// Role when the token was minted. Never trusted for authorization.
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of tokens minted by [`generate_access_token`].
    pub access_token_expiry_mins: i64,
    /// Clock skew tolerated when checking `exp`.
    pub leeway_secs: u64,
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required), `JWT_ACCESS_EXPIRY_MINS` and
    /// `JWT_LEEWAY_SECS`.
    ///
    /// # Panics
    ///
    /// On a missing or empty secret, or a non-numeric override.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.is_empty(), "JWT_SECRET must be set and non-empty");

        let access_token_expiry_mins = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .map(|v| v.parse().expect("JWT_ACCESS_EXPIRY_MINS must be an integer"))
            .unwrap_or(DEFAULT_EXPIRY_MINS);
        let leeway_secs = std::env::var("JWT_LEEWAY_SECS")
            .map(|v| v.parse().expect("JWT_LEEWAY_SECS must be an integer"))
            .unwrap_or(DEFAULT_LEEWAY_SECS);

        Self {
            secret,
            access_token_expiry_mins,
            leeway_secs,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        validation
    }
}

pub fn generate_access_token(
    user_id: DbId,
    role: Role,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: iat + config.access_token_expiry_mins * 60,
        iat,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature and expiry and return the payload.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &config.validation(),
    )
    .map(|data| data.claims)
}
