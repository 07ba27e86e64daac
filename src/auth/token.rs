use crate::config::JwtConfig;
use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Id of the authenticated user.
    pub uid: i64,
    pub role: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Claims carried by a refresh token. No user role, fixed subject.
#[derive(Debug, Serialize, Deserialize)]
struct RefreshClaims {
    sub: String,
    iat: usize,
    exp: usize,
}

const REFRESH_SUBJECT: &str = "refresh";

/// Signs and verifies HS256 tokens.
///
/// Access and refresh tokens use different secrets, so a refresh token never verifies
/// as an access token.
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        // expiry is exact, no grace period
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            validation,
            access_ttl: Duration::from_secs(config.access_ttl_minutes * 60),
            refresh_ttl: Duration::from_secs(config.refresh_ttl_hours * 60 * 60),
        }
    }

    /// Mints an access token for `user_id` with `role`, returning it with its lifetime.
    pub fn issue_access(&self, user_id: i64, role: &str) -> Result<(String, Duration), AppError> {
        let (iat, exp) = window(self.access_ttl);
        let claims = Claims {
            uid: user_id,
            role: role.to_string(),
            iat,
            exp,
        };
        let token = encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))?;
        log::debug!("access token issued for user {}", user_id);
        Ok((token, self.access_ttl))
    }

    /// Mints a refresh token. Nothing consumes these yet.
    pub fn issue_refresh(&self, user_id: i64) -> Result<(String, Duration), AppError> {
        let (iat, exp) = window(self.refresh_ttl);
        let claims = RefreshClaims {
            sub: REFRESH_SUBJECT.to_string(),
            iat,
            exp,
        };
        let token = encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))?;
        log::debug!("refresh token issued for user {}", user_id);
        Ok((token, self.refresh_ttl))
    }

    /// Verifies signature and expiry of an access token and returns its claims.
    pub fn parse_access(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.access_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("access token rejected: {}", e);
                AppError::InvalidToken
            })
    }
}

fn window(ttl: Duration) -> (usize, usize) {
    let now = chrono::Utc::now().timestamp() as usize;
    (now, now + ttl.as_secs() as usize)
}
