use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::errors::DatabaseError;
use crate::types::db::tenant::{self, Entity as Tenant};

/// Repository for tenant lookups
///
/// Stateless; callers thread the connection (or transaction) handle through.
pub struct TenantStore;

impl TenantStore {
    pub fn new() -> Self {
        Self
    }

    /// Look up a tenant by its API credential. Index-backed; returns inactive
    /// tenants too so the registry can distinguish the rejection reason.
    pub async fn find_by_api_key(
        &self,
        conn: &impl ConnectionTrait,
        api_key: &str,
    ) -> Result<Option<tenant::Model>, DatabaseError> {
        Tenant::find()
            .filter(tenant::Column::ApiKey.eq(api_key))
            .one(conn)
            .await
            .map_err(|e| DatabaseError::from_db_err("find_tenant_by_api_key", e))
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        tenant_id: &str,
    ) -> Result<Option<tenant::Model>, DatabaseError> {
        Tenant::find_by_id(tenant_id)
            .one(conn)
            .await
            .map_err(|e| DatabaseError::from_db_err("find_tenant_by_id", e))
    }

    pub async fn find_by_slug(
        &self,
        conn: &impl ConnectionTrait,
        slug: &str,
    ) -> Result<Option<tenant::Model>, DatabaseError> {
        Tenant::find()
            .filter(tenant::Column::Slug.eq(slug))
            .one(conn)
            .await
            .map_err(|e| DatabaseError::from_db_err("find_tenant_by_slug", e))
    }
}

impl Default for TenantStore {
    fn default() -> Self {
        Self::new()
    }
}
