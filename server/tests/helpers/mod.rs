//! Reusable test helpers for moderation integration tests.
//!
//! Provides a seeded in-memory store, [`FailingStore`], which injects
//! write failures into one of the two role records, and [`RacingStore`],
//! which changes a user's role right after it has been read.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reinos_roles::RoleString;
use reinos_server::moderation::ModerationService;
use reinos_server::store::{MemoryRoleStore, RoleRecord, RoleStore, StoreError};
use uuid::Uuid;

/// Users seeded into every test community.
pub struct Community {
    pub autor: Uuid,
    pub admin: Uuid,
    pub officer: Uuid,
    pub guard: Uuid,
    pub veteran: Uuid,
    pub citizen: Uuid,
    pub traveller: Uuid,
    pub banned: Uuid,
}

impl Community {
    /// Seed one user per staff and member role into `store`.
    pub fn seed(store: &MemoryRoleStore) -> Self {
        let community = Self {
            autor: Uuid::now_v7(),
            admin: Uuid::now_v7(),
            officer: Uuid::now_v7(),
            guard: Uuid::now_v7(),
            veteran: Uuid::now_v7(),
            citizen: Uuid::now_v7(),
            traveller: Uuid::now_v7(),
            banned: Uuid::now_v7(),
        };

        store.seed(community.autor, "Autor");
        store.seed(community.admin, "Administrador");
        store.seed(community.officer, "Luminir");
        store.seed(community.guard, "Mehalkir");
        store.seed(community.veteran, "Veterano de Eldor");
        store.seed(community.citizen, "Cidadão de Gápenver");
        store.seed(community.traveller, "Viajante");
        store.seed(community.banned, "Banido");

        community
    }
}

/// Service over a fresh in-memory store with a seeded community.
pub fn memory_service() -> (ModerationService<MemoryRoleStore>, Community) {
    let store = MemoryRoleStore::new();
    let community = Community::seed(&store);
    (ModerationService::new(store), community)
}

/// Store that fails every write to one record.
#[derive(Debug, Clone)]
pub struct FailingStore {
    pub inner: MemoryRoleStore,
    pub fail_on: RoleRecord,
}

impl FailingStore {
    pub fn new(inner: MemoryRoleStore, fail_on: RoleRecord) -> Self {
        Self { inner, fail_on }
    }
}

impl RoleStore for FailingStore {
    async fn read_role(
        &self,
        user_id: Uuid,
        record: RoleRecord,
    ) -> Result<Option<RoleString>, StoreError> {
        self.inner.read_role(user_id, record).await
    }

    async fn write_role(
        &self,
        user_id: Uuid,
        record: RoleRecord,
        role: &RoleString,
    ) -> Result<(), StoreError> {
        if record == self.fail_on {
            return Err(StoreError::Unavailable(format!("{record} write rejected")));
        }
        self.inner.write_role(user_id, record, role).await
    }

    async fn write_role_if(
        &self,
        user_id: Uuid,
        record: RoleRecord,
        expected: Option<&RoleString>,
        role: &RoleString,
    ) -> Result<(), StoreError> {
        if record == self.fail_on {
            return Err(StoreError::Unavailable(format!("{record} write rejected")));
        }
        self.inner.write_role_if(user_id, record, expected, role).await
    }
}

/// Store that reseeds `user_id` with `replacement` once, immediately after
/// the first read of that user's profile. Simulates a concurrent handler.
#[derive(Debug, Clone)]
pub struct RacingStore {
    pub inner: MemoryRoleStore,
    pub user_id: Uuid,
    pub replacement: RoleString,
    raced: Arc<AtomicBool>,
}

impl RacingStore {
    pub fn new(inner: MemoryRoleStore, user_id: Uuid, replacement: &str) -> Self {
        Self {
            inner,
            user_id,
            replacement: RoleString::from(replacement),
            raced: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl RoleStore for RacingStore {
    async fn read_role(
        &self,
        user_id: Uuid,
        record: RoleRecord,
    ) -> Result<Option<RoleString>, StoreError> {
        let role = self.inner.read_role(user_id, record).await?;
        if user_id == self.user_id
            && record == RoleRecord::Profile
            && !self.raced.swap(true, Ordering::SeqCst)
        {
            self.inner.seed(user_id, self.replacement.clone());
        }
        Ok(role)
    }

    async fn write_role(
        &self,
        user_id: Uuid,
        record: RoleRecord,
        role: &RoleString,
    ) -> Result<(), StoreError> {
        self.inner.write_role(user_id, record, role).await
    }

    async fn write_role_if(
        &self,
        user_id: Uuid,
        record: RoleRecord,
        expected: Option<&RoleString>,
        role: &RoleString,
    ) -> Result<(), StoreError> {
        self.inner.write_role_if(user_id, record, expected, role).await
    }
}

/// Read both records of a user.
pub async fn both_records<S: RoleStore>(
    store: &S,
    user_id: Uuid,
) -> (Option<RoleString>, Option<RoleString>) {
    let profile = store
        .read_role(user_id, RoleRecord::Profile)
        .await
        .expect("profile read");
    let metadata = store
        .read_role(user_id, RoleRecord::AuthMetadata)
        .await
        .expect("metadata read");
    (profile, metadata)
}
