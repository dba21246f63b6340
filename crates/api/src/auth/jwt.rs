//! Access and refresh tokens.
//!
//! Access tokens are HS256 JWTs carrying the caller's id, role and superuser
//! flag. Refresh tokens are opaque; the database keeps only their SHA-256
//! digest. Both expire against the wall clock, which is what `jsonwebtoken`
//! validates `exp` with.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use yamdb_core::roles::{Actor, Role};
use yamdb_core::types::{DbId, Timestamp};

use crate::config::env_or;

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

/// | Env Var                   | Default  |
/// |---------------------------|----------|
/// | `JWT_SECRET`              | required |
/// | `JWT_ACCESS_EXPIRY_MINS`  | `60`     |
/// | `JWT_REFRESH_EXPIRY_DAYS` | `7`      |
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is unset or empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.is_empty(), "JWT_SECRET must be set to a non-empty value");

        Self {
            secret,
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS),
            refresh_token_expiry_days: env_or(
                "JWT_REFRESH_EXPIRY_DAYS",
                DEFAULT_REFRESH_EXPIRY_DAYS,
            ),
        }
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::minutes(self.access_token_expiry_mins)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::days(self.refresh_token_expiry_days)
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.as_bytes())
    }
}

/// Payload of an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    pub role: Role,
    pub is_superuser: bool,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    fn new(actor: &Actor, issued_at: Timestamp, ttl: Duration) -> Self {
        Self {
            sub: actor.user_id,
            role: actor.role,
            is_superuser: actor.is_superuser,
            exp: (issued_at + ttl).timestamp(),
            iat: issued_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.sub,
            role: self.role,
            is_superuser: self.is_superuser,
        }
    }
}

/// A signed access token and its lifetime in seconds.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_in: i64,
}

pub fn issue_access_token(
    actor: &Actor,
    config: &JwtConfig,
) -> Result<AccessToken, jsonwebtoken::errors::Error> {
    let ttl = config.access_ttl();
    let claims = Claims::new(actor, Utc::now(), ttl);
    let token = encode(&Header::default(), &claims, &config.encoding_key())?;
    Ok(AccessToken {
        token,
        expires_in: ttl.num_seconds(),
    })
}

/// Check signature and expiry, then return the claims.
pub fn decode_access_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(token, &config.decoding_key(), &Validation::default()).map(|data| data.claims)
}

/// A freshly minted refresh token. Only `hash` is ever stored.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub plaintext: String,
    pub hash: String,
    pub expires_at: Timestamp,
}

impl RefreshToken {
    pub fn generate(config: &JwtConfig) -> Self {
        let plaintext = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        Self {
            hash: Self::digest(&plaintext),
            plaintext,
            expires_at: Utc::now() + config.refresh_ttl(),
        }
    }

    /// Hex SHA-256 of a presented token, for lookup.
    pub fn digest(token: &str) -> String {
        format!("{:x}", Sha256::digest(token.as_bytes()))
    }
}
