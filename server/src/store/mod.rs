//! Role storage.
//!
//! Every user's role string lives in two independently writable records:
//! the auth-service metadata and the profile row. The profile row is
//! authoritative; metadata is a denormalized copy that must be rewritten
//! after every successful role change. There is no cross-record transaction.

mod memory;
mod postgres;

use std::future::Future;

use reinos_roles::RoleString;
use serde::Serialize;
use uuid::Uuid;

pub use memory::MemoryRoleStore;
pub use postgres::{create_pool, PgRoleStore};

/// One of the two records holding a user's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleRecord {
    /// Auth-service user metadata (denormalized cache).
    AuthMetadata,
    /// Profile row (authoritative).
    Profile,
}

impl RoleRecord {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthMetadata => "auth_metadata",
            Self::Profile => "profile",
        }
    }
}

impl std::fmt::Display for RoleRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("User not found")]
    UserNotFound,

    /// A conditional write found a different role than the one expected.
    #[error("Role record changed concurrently")]
    Conflict,

    #[error("Role store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Read and write access to both role records.
///
/// Implementations do not retry; retry policy, if any, belongs to the caller.
pub trait RoleStore: Send + Sync {
    /// Stored role string, or `None` if the record has no role.
    fn read_role(
        &self,
        user_id: Uuid,
        record: RoleRecord,
    ) -> impl Future<Output = Result<Option<RoleString>, StoreError>> + Send;

    /// Overwrite the role string in one record.
    fn write_role(
        &self,
        user_id: Uuid,
        record: RoleRecord,
        role: &RoleString,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite the role string only while the record still holds
    /// `expected` (`None` meaning no role). Otherwise fails with
    /// [`StoreError::Conflict`] and writes nothing.
    fn write_role_if(
        &self,
        user_id: Uuid,
        record: RoleRecord,
        expected: Option<&RoleString>,
        role: &RoleString,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
