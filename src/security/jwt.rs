/// Bearer token issuing and validation using HS256
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::AppError;
use crate::models::User;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Unique token ID
    pub jti: String,
    /// Issuer
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
}

/// Signs and validates bearer tokens. Built once at startup from [`JwtConfig`]
/// and shared through actix app data; holds the only copies of the keys.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    expiry: Duration,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            expiry: Duration::days(config.expiry_days),
        }
    }

    /// Issue a signed token for a verified identity
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        self.issue_with_expiry(user, self.expiry)
    }

    fn issue_with_expiry(&self, user: &User, expiry: Duration) -> Result<String, AppError> {
        let now = Utc::now();

        let claims = Claims {
            sub: user.id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + expiry).timestamp(),
            email: user.email.clone(),
            name: user.display_name.clone(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Validate a token's signature, expiry, and issuer, returning its claims
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-at-least-32-chars-long!!".into(),
            issuer: "chat-service".into(),
            expiry_days: 7,
        }
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "test@example.com".into(),
            display_name: "testuser".into(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_well_formed_token() {
        let issuer = TokenIssuer::new(&test_config());
        let token = issuer.issue(&test_user()).unwrap();

        assert!(!token.is_empty());
        // JWT tokens have 3 parts separated by dots
        assert_eq!(token.matches('.').count(), 2);
    }

    #[test]
    fn test_validate_round_trip() {
        let issuer = TokenIssuer::new(&test_config());
        let user = test_user();

        let token = issuer.issue(&user).unwrap();
        let claims = issuer.validate(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.name, user.display_name);
        assert_eq!(claims.iss, "chat-service");
        assert!(claims.exp > claims.iat);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_validate_garbage_token() {
        let issuer = TokenIssuer::new(&test_config());
        assert!(issuer.validate("not.a.valid.token").is_err());
    }

    #[test]
    fn test_validate_wrong_secret() {
        let issuer = TokenIssuer::new(&test_config());
        let other = TokenIssuer::new(&JwtConfig {
            secret: "completely-different-secret-value!!!".into(),
            ..test_config()
        });

        let token = issuer.issue(&test_user()).unwrap();
        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn test_validate_wrong_issuer() {
        let issuer = TokenIssuer::new(&test_config());
        let other = TokenIssuer::new(&JwtConfig {
            issuer: "some-other-service".into(),
            ..test_config()
        });

        let token = issuer.issue(&test_user()).unwrap();
        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = TokenIssuer::new(&test_config());
        let token = issuer
            .issue_with_expiry(&test_user(), Duration::days(-1))
            .unwrap();

        assert!(issuer.validate(&token).is_err());
    }

    #[test]
    fn test_expiry_matches_config() {
        let issuer = TokenIssuer::new(&test_config());
        let token = issuer.issue(&test_user()).unwrap();
        let claims = issuer.validate(&token).unwrap();

        let expected = Utc::now().timestamp() + 7 * 24 * 3600;
        // Allow a little tolerance for execution time
        assert!(claims.exp >= expected - 5);
        assert!(claims.exp <= expected + 5);
    }
}
