//! `PostgreSQL` role store.
//!
//! - Profile record: `profiles.role`
//! - Auth metadata record: `auth.users.raw_user_meta_data->>'role'`

use std::time::Duration;

use anyhow::Result;
use reinos_roles::RoleString;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{RoleRecord, RoleStore, StoreError};

/// Create `PostgreSQL` connection pool with health configuration.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(10)
        // Prevent hanging requests on pool exhaustion
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .test_before_acquire(true)
        .connect(database_url)
        .await?;

    info!("Connected to PostgreSQL");
    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct PgRoleStore {
    pool: PgPool,
}

impl PgRoleStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl RoleStore for PgRoleStore {
    #[tracing::instrument(skip(self))]
    async fn read_role(
        &self,
        user_id: Uuid,
        record: RoleRecord,
    ) -> Result<Option<RoleString>, StoreError> {
        let sql = match record {
            RoleRecord::Profile => "SELECT role FROM profiles WHERE id = $1",
            RoleRecord::AuthMetadata => {
                "SELECT raw_user_meta_data->>'role' FROM auth.users WHERE id = $1"
            }
        };

        let role: Option<Option<String>> = sqlx::query_scalar(sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role.flatten().map(RoleString::from))
    }

    #[tracing::instrument(skip(self, role))]
    async fn write_role(
        &self,
        user_id: Uuid,
        record: RoleRecord,
        role: &RoleString,
    ) -> Result<(), StoreError> {
        let sql = match record {
            RoleRecord::Profile => "UPDATE profiles SET role = $2 WHERE id = $1",
            RoleRecord::AuthMetadata => {
                r"
                UPDATE auth.users
                SET raw_user_meta_data = jsonb_set(
                    COALESCE(raw_user_meta_data, '{}'::jsonb),
                    '{role}',
                    to_jsonb($2::text)
                )
                WHERE id = $1
                "
            }
        };

        let result = sqlx::query(sql)
            .bind(user_id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::UserNotFound);
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, expected, role))]
    async fn write_role_if(
        &self,
        user_id: Uuid,
        record: RoleRecord,
        expected: Option<&RoleString>,
        role: &RoleString,
    ) -> Result<(), StoreError> {
        let sql = match record {
            RoleRecord::Profile => {
                r"
                UPDATE profiles SET role = $2
                WHERE id = $1 AND role IS NOT DISTINCT FROM $3::text
                "
            }
            RoleRecord::AuthMetadata => {
                r"
                UPDATE auth.users
                SET raw_user_meta_data = jsonb_set(
                    COALESCE(raw_user_meta_data, '{}'::jsonb),
                    '{role}',
                    to_jsonb($2::text)
                )
                WHERE id = $1
                  AND raw_user_meta_data->>'role' IS NOT DISTINCT FROM $3::text
                "
            }
        };

        let result = sqlx::query(sql)
            .bind(user_id)
            .bind(role.as_str())
            .bind(expected.map(RoleString::as_str))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let exists_sql = match record {
            RoleRecord::Profile => "SELECT EXISTS(SELECT 1 FROM profiles WHERE id = $1)",
            RoleRecord::AuthMetadata => "SELECT EXISTS(SELECT 1 FROM auth.users WHERE id = $1)",
        };
        let exists: bool = sqlx::query_scalar(exists_sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Err(if exists {
            StoreError::Conflict
        } else {
            StoreError::UserNotFound
        })
    }
}
