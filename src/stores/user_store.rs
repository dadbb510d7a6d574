use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::errors::DatabaseError;
use crate::types::db::user::{self, Entity as User};

/// Lock duration applied after too many failed logins
const LOCKOUT_SECS: i64 = 15 * 60;
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Repository for user rows backing the session auth surface
pub struct UserStore;

impl UserStore {
    pub fn new() -> Self {
        Self
    }

    /// Email is unique within a tenant, so the pair pins down one row
    pub async fn find_by_email(
        &self,
        conn: &impl ConnectionTrait,
        tenant_id: &str,
        email: &str,
    ) -> Result<Option<user::Model>, DatabaseError> {
        User::find()
            .filter(user::Column::TenantId.eq(tenant_id))
            .filter(user::Column::Email.eq(email))
            .one(conn)
            .await
            .map_err(|e| DatabaseError::from_db_err("find_user_by_email", e))
    }

    /// Record a failed login; the fifth consecutive failure locks the account
    pub async fn record_login_failure(
        &self,
        conn: &impl ConnectionTrait,
        user: user::Model,
    ) -> Result<(), DatabaseError> {
        let attempts = user.failed_login_attempts + 1;
        let locked_until = if attempts >= MAX_FAILED_ATTEMPTS {
            Some(Utc::now().timestamp() + LOCKOUT_SECS)
        } else {
            user.locked_until
        };

        let mut active: user::ActiveModel = user.into();
        active.failed_login_attempts = Set(attempts);
        active.locked_until = Set(locked_until);
        active.updated_at = Set(Utc::now().timestamp());
        active
            .update(conn)
            .await
            .map_err(|e| DatabaseError::from_db_err("record_login_failure", e))?;

        Ok(())
    }

    /// Reset the failure counter after a successful login
    pub async fn record_login_success(
        &self,
        conn: &impl ConnectionTrait,
        user: user::Model,
    ) -> Result<(), DatabaseError> {
        let mut active: user::ActiveModel = user.into();
        active.failed_login_attempts = Set(0);
        active.locked_until = Set(None);
        active.updated_at = Set(Utc::now().timestamp());
        active
            .update(conn)
            .await
            .map_err(|e| DatabaseError::from_db_err("record_login_success", e))?;

        Ok(())
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
