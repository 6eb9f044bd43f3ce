pub mod password;
pub mod policy;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::{User, UserClaim};

pub use password::{PasswordHasher, PasswordRules};
pub use policy::ClaimPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub jti: Uuid,
    pub iss: String,
    pub aud: String,
    pub nbf: i64,
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub claims: Vec<UserClaim>,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

/// Body returned by /register and /login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: UserToken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserToken {
    pub id: Uuid,
    pub email: String,
    pub claims: Vec<UserClaim>,
}

/// Signs and verifies HS256 bearer tokens with the configured settings
#[derive(Clone)]
pub struct TokenService {
    secret: Vec<u8>,
    issuer: String,
    audience: String,
    expiry: Duration,
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            secret: security.jwt_secret.as_bytes().to_vec(),
            issuer: security.jwt_issuer.clone(),
            audience: security.jwt_audience.clone(),
            expiry: security.jwt_expiry(),
        }
    }

    pub fn issue(
        &self,
        user: &User,
        roles: Vec<String>,
        claims: Vec<UserClaim>,
    ) -> Result<AccessToken, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let now = Utc::now();
        let token_claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            jti: Uuid::new_v4(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            nbf: now.timestamp(),
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
            roles,
            claims: claims.clone(),
        };

        let encoding_key = EncodingKey::from_secret(&self.secret);
        let access_token = encode(&Header::new(Algorithm::HS256), &token_claims, &encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))?;

        Ok(AccessToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.expiry.num_seconds(),
            user: UserToken {
                id: user.id,
                email: user.email.clone(),
                claims,
            },
        })
    }

    /// Verify signature, expiry, issuer and audience, returning the claims
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_nbf = true;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);

        let decoding_key = DecodingKey::from_secret(&self.secret);
        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "owner@example.com".to_string(),
            normalized_email: "owner@example.com".to_string(),
            password_hash: String::new(),
            email_confirmed: true,
            failed_login_count: 0,
            lockout_end: None,
            created_at: Utc::now(),
        }
    }

    fn remove_claim() -> UserClaim {
        UserClaim {
            claim_type: "Provider".to_string(),
            claim_value: "Remove".to_string(),
        }
    }

    #[test]
    fn issued_token_carries_subject_roles_and_claims() {
        let service = TokenService::new(&AppConfig::development().security);
        let user = user();

        let token = service
            .issue(&user, vec!["Admin".to_string()], vec![remove_claim()])
            .unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 2 * 3600);
        assert_eq!(token.user.id, user.id);

        let claims = service.validate(&token.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "owner@example.com");
        assert_eq!(claims.roles, vec!["Admin".to_string()]);
        assert_eq!(claims.claims, vec![remove_claim()]);
    }

    #[test]
    fn rejects_token_signed_with_another_secret() {
        let mut other = AppConfig::development().security;
        other.jwt_secret = "some-other-secret".to_string();
        let token = TokenService::new(&other).issue(&user(), vec![], vec![]).unwrap();

        let service = TokenService::new(&AppConfig::development().security);
        assert!(matches!(
            service.validate(&token.access_token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn rejects_token_for_another_audience() {
        let mut other = AppConfig::development().security;
        other.jwt_audience = "https://elsewhere.example.com".to_string();
        let token = TokenService::new(&other).issue(&user(), vec![], vec![]).unwrap();

        let service = TokenService::new(&AppConfig::development().security);
        assert!(service.validate(&token.access_token).is_err());
    }

    #[test]
    fn oversized_expiry_is_capped() {
        let mut security = AppConfig::development().security;
        security.jwt_expiry_hours = u64::MAX;
        let token = TokenService::new(&security).issue(&user(), vec![], vec![]).unwrap();
        assert_eq!(token.expires_in, 24 * 365 * 3600);
    }

    #[test]
    fn refuses_to_work_without_a_secret() {
        let mut security = AppConfig::development().security;
        security.jwt_secret = String::new();
        let service = TokenService::new(&security);

        assert!(matches!(service.issue(&user(), vec![], vec![]), Err(JwtError::InvalidSecret)));
        assert!(matches!(service.validate("a.b.c"), Err(JwtError::InvalidSecret)));
    }
}
