use super::config::JwtConfig;
use crate::errors::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token lifetime: seven days.
pub const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Claims carried by every AgroNet access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// User id
    pub sub: String,
    pub email: String,
    /// `buyer`, `farmer` or `admin`
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Bad signature, malformed token or past `exp`
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken(_) => {
                AppError::Unauthorized("Invalid or expired token".to_string())
            }
            TokenError::Signing(msg) => AppError::InternalServerError(msg),
        }
    }
}

/// Stateless HS256 token issuer and verifier.
#[derive(Clone)]
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl_secs: config.ttl_secs,
        }
    }

    /// Issues a token for the given subject.
    pub fn create_token(&self, user_id: &str, email: &str, role: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Checks signature and expiry, then returns the claims.
    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, TokenError> {
        decode::<JwtClaims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| TokenError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough-for-hs256";

    #[test]
    fn test_token_round_trip_keeps_identity() {
        let auth = JwtAuth::new(&JwtConfig::new(SECRET));
        let user_id = Uuid::now_v7().to_string();

        let token = auth.create_token(&user_id, "jane@test.com", "farmer").unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "jane@test.com");
        assert_eq!(claims.role, "farmer");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let auth = JwtAuth::new(&JwtConfig::new(SECRET));
        let buyer = auth.create_token("u1", "a@b.c", "buyer").unwrap();
        let admin = auth.create_token("u1", "a@b.c", "admin").unwrap();

        // Buyer's header and signature around the admin payload
        let buyer_parts: Vec<&str> = buyer.split('.').collect();
        let admin_parts: Vec<&str> = admin.split('.').collect();
        let forged = format!("{}.{}.{}", buyer_parts[0], admin_parts[1], buyer_parts[2]);

        assert!(matches!(
            auth.verify_token(&forged),
            Err(TokenError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = JwtAuth::new(&JwtConfig::new(SECRET));
        let verifier = JwtAuth::new(&JwtConfig::new("another-secret-that-is-also-32-chars-long"));

        let token = issuer.create_token("u1", "a@b.c", "buyer").unwrap();
        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = JwtAuth::new(&JwtConfig::new(SECRET).with_ttl_secs(-3600));
        let token = auth.create_token("u1", "a@b.c", "buyer").unwrap();

        assert!(matches!(
            auth.verify_token(&token),
            Err(TokenError::InvalidToken(_))
        ));
    }
}
