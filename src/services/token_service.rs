use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::internal::AuthRejection;
use crate::errors::IngestError;
use crate::types::db::user;

/// JWT claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Tenant the session is bound to
    pub tenant_id: String,
    pub role: String,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
}

/// Issues and validates HS256 session tokens for the human auth surface
pub struct TokenService {
    secret: String,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: String, ttl_secs: i64) -> Self {
        Self { secret, ttl_secs }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn issue(&self, user: &user::Model) -> Result<String, IngestError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.clone(),
            tenant_id: user.tenant_id.clone(),
            role: user.role.clone(),
            exp: now + self.ttl_secs,
            iat: now,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| IngestError::Internal(format!("Token signing failed: {}", e)))
    }

    pub fn validate(&self, token: &str) -> Result<Claims, IngestError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("Session token rejected: {}", e);
            IngestError::Unauthorized(AuthRejection::UnknownCredential)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> user::Model {
        user::Model {
            id: "u-1".to_string(),
            tenant_id: "t-1".to_string(),
            email: "dev@example.com".to_string(),
            password_hash: String::new(),
            role: "admin".to_string(),
            is_active: true,
            failed_login_attempts: 0,
            locked_until: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn issued_tokens_validate_and_carry_the_tenant() {
        let service = TokenService::new("test-secret".to_string(), 1800);

        let token = service.issue(&test_user()).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.tenant_id, "t-1");
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tokens_signed_with_a_different_secret_are_rejected() {
        let issuer = TokenService::new("secret-a".to_string(), 1800);
        let verifier = TokenService::new("secret-b".to_string(), 1800);

        let token = issuer.issue(&test_user()).unwrap();
        assert!(verifier.validate(&token).is_err());
    }
}
