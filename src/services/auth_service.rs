use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::errors::internal::AuthRejection;
use crate::errors::IngestError;
use crate::services::TokenService;
use crate::stores::{TenantStore, UserStore};
use crate::types::dto::auth::TokenResponse;

/// Session login for human users
///
/// Every rejection surfaces as `unauthorized` so the response does not leak
/// whether the tenant, the user, or the password was wrong; the logs carry
/// the distinction.
pub struct AuthService {
    db: DatabaseConnection,
    tenant_store: TenantStore,
    user_store: UserStore,
    token_service: Arc<TokenService>,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, token_service: Arc<TokenService>) -> Self {
        Self {
            db,
            tenant_store: TenantStore::new(),
            user_store: UserStore::new(),
            token_service,
        }
    }

    pub async fn login(
        &self,
        tenant_slug: &str,
        email: &str,
        password: &str,
    ) -> Result<TokenResponse, IngestError> {
        let tenant = self
            .tenant_store
            .find_by_slug(&self.db, tenant_slug)
            .await
            .map_err(IngestError::Database)?
            .filter(|tenant| tenant.is_active)
            .ok_or_else(|| {
                tracing::warn!(tenant = %tenant_slug, "Login rejected: unknown or inactive tenant");
                IngestError::Unauthorized(AuthRejection::UnknownCredential)
            })?;

        let user = self
            .user_store
            .find_by_email(&self.db, &tenant.id, email)
            .await
            .map_err(IngestError::Database)?
            .filter(|user| user.is_active)
            .ok_or_else(|| {
                tracing::warn!(tenant_id = %tenant.id, "Login rejected: unknown or inactive user");
                IngestError::Unauthorized(AuthRejection::UnknownCredential)
            })?;

        if let Some(locked_until) = user.locked_until {
            if locked_until > Utc::now().timestamp() {
                tracing::warn!(user_id = %user.id, "Login rejected: account locked");
                return Err(IngestError::Unauthorized(AuthRejection::UnknownCredential));
            }
        }

        if !verify_password(password, &user.password_hash) {
            tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
            self.user_store
                .record_login_failure(&self.db, user)
                .await
                .map_err(IngestError::Database)?;
            return Err(IngestError::Unauthorized(AuthRejection::UnknownCredential));
        }

        let token = self.token_service.issue(&user)?;
        self.user_store
            .record_login_success(&self.db, user)
            .await
            .map_err(IngestError::Database)?;

        Ok(TokenResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_service.ttl_secs(),
        })
    }
}

/// Hash a password with Argon2id; used by the administrative user flow and
/// by test fixtures.
pub fn hash_password(password: &str) -> Result<String, IngestError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IngestError::Internal(format!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
