//! Moderation service.
//!
//! Resolves role strings from the store, asks the role library for a
//! decision, and performs role changes as a two-phase write: profile first,
//! then auth metadata.

use chrono::Utc;
use reinos_roles::{
    can_modify_roles, check_modify, check_role_change, filter_listing, Action,
    PermissionDecision, Role, RoleString,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::error::ModerationError;
use super::types::{RoleChange, RoleConsistency, StaffMember};
use crate::store::{RoleRecord, RoleStore, StoreError};

/// Permission checks and role mutations backed by a [`RoleStore`].
#[derive(Debug, Clone)]
pub struct ModerationService<S> {
    store: S,
}

impl<S: RoleStore> ModerationService<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Canonical role of a user, read from the authoritative profile record.
    /// A user without a profile role is `default`.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_role(&self, user_id: Uuid) -> Result<Role, StoreError> {
        let stored = self.store.read_role(user_id, RoleRecord::Profile).await?;
        Ok(stored.as_ref().map_or(Role::Unknown, RoleString::canonical))
    }

    /// Evaluate `action` by `caller_id` against `target_id`.
    #[tracing::instrument(skip(self))]
    pub async fn authorize(
        &self,
        caller_id: Uuid,
        target_id: Uuid,
        action: Action,
    ) -> Result<PermissionDecision, StoreError> {
        let caller = self.resolve_role(caller_id).await?;
        let target = self.resolve_role(target_id).await?;

        let decision = can_modify_roles(caller, target, action);
        if !decision.allowed {
            info!(
                %caller_id,
                %target_id,
                action = action.action_name(),
                reason = %decision.reason,
                "Moderation action denied"
            );
        }
        Ok(decision)
    }

    /// Like [`Self::authorize`], but a denial is an error.
    ///
    /// # Example
    ///
    /// ```ignore
    /// service.require(auth.id, topic.author_id, Action::DeleteContent).await?;
    /// delete_topic(&pool, topic.id).await?;
    /// ```
    pub async fn require(
        &self,
        caller_id: Uuid,
        target_id: Uuid,
        action: Action,
    ) -> Result<(), ModerationError> {
        let caller = self.resolve_role(caller_id).await?;
        let target = self.resolve_role(target_id).await?;
        check_modify(caller, target, action)?;
        Ok(())
    }

    /// Change `target_id`'s role to `requested`.
    ///
    /// Kingdom-bound roles are stored as `"<Title> de <Kingdom>"`; when no
    /// kingdom is given, the target's current kingdom is kept.
    ///
    /// The profile record is written first, and only if it still holds the
    /// role the check ran against; otherwise nothing is written and the
    /// error is [`StoreError::Conflict`]. If the auth metadata write then
    /// fails, the change is reported as [`ModerationError::PartialUpdate`]
    /// and not retried.
    #[tracing::instrument(skip(self))]
    pub async fn change_role(
        &self,
        caller_id: Uuid,
        target_id: Uuid,
        requested: Role,
        kingdom: Option<&str>,
    ) -> Result<RoleChange, ModerationError> {
        let caller = self.resolve_role(caller_id).await?;
        let previous = self
            .store
            .read_role(target_id, RoleRecord::Profile)
            .await?;
        let target = previous.as_ref().map_or(Role::Unknown, RoleString::canonical);

        if let Err(e) = check_role_change(caller, target, requested) {
            info!(
                %caller_id,
                %target_id,
                %requested,
                reason = %e.reason(),
                "Role change denied"
            );
            return Err(e.into());
        }

        let kingdom = kingdom.or_else(|| previous.as_ref().and_then(RoleString::kingdom));
        let new_role = RoleString::for_role(requested, kingdom);

        // Only write over the role that was checked.
        if let Err(e) = self
            .store
            .write_role_if(target_id, RoleRecord::Profile, previous.as_ref(), &new_role)
            .await
        {
            if matches!(e, StoreError::Conflict) {
                warn!(%caller_id, %target_id, "Target role changed during role change");
            }
            return Err(e.into());
        }

        if let Err(source) = self
            .store
            .write_role(target_id, RoleRecord::AuthMetadata, &new_role)
            .await
        {
            error!(
                %target_id,
                error = %source,
                "Auth metadata role write failed after profile write"
            );
            return Err(ModerationError::PartialUpdate {
                user_id: target_id,
                written: RoleRecord::Profile,
                failed: RoleRecord::AuthMetadata,
                source,
            });
        }

        info!(
            %caller_id,
            %target_id,
            from = %target,
            to = %requested,
            "Role changed"
        );

        Ok(RoleChange {
            actor_id: caller_id,
            target_id,
            previous,
            new: new_role,
            changed_at: Utc::now(),
        })
    }

    /// Compare the two role records of a user. Divergence is reported, never
    /// repaired here.
    #[tracing::instrument(skip(self))]
    pub async fn check_consistency(&self, user_id: Uuid) -> Result<RoleConsistency, StoreError> {
        let profile = self.store.read_role(user_id, RoleRecord::Profile).await?;
        let metadata = self
            .store
            .read_role(user_id, RoleRecord::AuthMetadata)
            .await?;

        if profile == metadata {
            return Ok(RoleConsistency::InSync { role: profile });
        }

        let state = RoleConsistency::Diverged { profile, metadata };
        warn!(
            %user_id,
            rank_mismatch = state.is_rank_mismatch(),
            "Role records diverged"
        );
        Ok(state)
    }

    /// Copy the profile role into the auth metadata record.
    ///
    /// Operator repair after a [`ModerationError::PartialUpdate`].
    #[tracing::instrument(skip(self))]
    pub async fn resync_metadata(&self, user_id: Uuid) -> Result<RoleString, ModerationError> {
        let profile = self
            .store
            .read_role(user_id, RoleRecord::Profile)
            .await?
            .ok_or(StoreError::UserNotFound)?;

        self.store
            .write_role(user_id, RoleRecord::AuthMetadata, &profile)
            .await?;

        info!(%user_id, "Auth metadata role resynced from profile");
        Ok(profile)
    }

    /// Listing rows `caller_id` may see.
    #[tracing::instrument(skip(self, members), fields(rows = members.len()))]
    pub async fn visible_members(
        &self,
        caller_id: Uuid,
        members: Vec<StaffMember>,
    ) -> Result<Vec<StaffMember>, StoreError> {
        let caller = self.resolve_role(caller_id).await?;
        Ok(filter_listing(caller, members, |m| m.role.canonical()).collect())
    }
}
