//! In-memory role store backed by `DashMap`.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use reinos_roles::RoleString;
use uuid::Uuid;

use super::{RoleRecord, RoleStore, StoreError};

/// Concurrent in-memory store. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoleStore {
    records: Arc<DashMap<(Uuid, RoleRecord), RoleString>>,
}

impl MemoryRoleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user with the same role string in both records.
    pub fn seed(&self, user_id: Uuid, role: impl Into<RoleString>) {
        let role = role.into();
        self.records
            .insert((user_id, RoleRecord::AuthMetadata), role.clone());
        self.records.insert((user_id, RoleRecord::Profile), role);
    }

    /// Set a single record, leaving the other untouched.
    pub fn seed_record(&self, user_id: Uuid, record: RoleRecord, role: impl Into<RoleString>) {
        self.records.insert((user_id, record), role.into());
    }

    fn knows(&self, user_id: Uuid) -> bool {
        self.records.contains_key(&(user_id, RoleRecord::Profile))
            || self.records.contains_key(&(user_id, RoleRecord::AuthMetadata))
    }
}

impl RoleStore for MemoryRoleStore {
    async fn read_role(
        &self,
        user_id: Uuid,
        record: RoleRecord,
    ) -> Result<Option<RoleString>, StoreError> {
        Ok(self
            .records
            .get(&(user_id, record))
            .map(|entry| entry.value().clone()))
    }

    async fn write_role(
        &self,
        user_id: Uuid,
        record: RoleRecord,
        role: &RoleString,
    ) -> Result<(), StoreError> {
        if !self.knows(user_id) {
            return Err(StoreError::UserNotFound);
        }
        self.records.insert((user_id, record), role.clone());
        Ok(())
    }

    async fn write_role_if(
        &self,
        user_id: Uuid,
        record: RoleRecord,
        expected: Option<&RoleString>,
        role: &RoleString,
    ) -> Result<(), StoreError> {
        if !self.knows(user_id) {
            return Err(StoreError::UserNotFound);
        }
        // The entry guard holds the shard lock across compare and swap.
        match self.records.entry((user_id, record)) {
            Entry::Occupied(mut entry) if Some(entry.get()) == expected => {
                entry.insert(role.clone());
                Ok(())
            }
            Entry::Vacant(entry) if expected.is_none() => {
                entry.insert(role.clone());
                Ok(())
            }
            _ => Err(StoreError::Conflict),
        }
    }
}
