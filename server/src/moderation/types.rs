//! Moderation Types

use chrono::{DateTime, Utc};
use reinos_roles::{Role, RoleString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A role change that was written to both records.
#[derive(Debug, Clone, Serialize)]
pub struct RoleChange {
    pub actor_id: Uuid,
    pub target_id: Uuid,
    /// Profile role before the change, if the target had one.
    pub previous: Option<RoleString>,
    pub new: RoleString,
    pub changed_at: DateTime<Utc>,
}

/// Agreement between a user's profile and auth metadata role strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoleConsistency {
    InSync {
        role: Option<RoleString>,
    },
    Diverged {
        profile: Option<RoleString>,
        metadata: Option<RoleString>,
    },
}

impl RoleConsistency {
    #[must_use]
    pub const fn is_in_sync(&self) -> bool {
        matches!(self, Self::InSync { .. })
    }

    /// Whether the two copies disagree on the canonical role, not just on
    /// text such as the kingdom suffix.
    #[must_use]
    pub fn is_rank_mismatch(&self) -> bool {
        match self {
            Self::InSync { .. } => false,
            Self::Diverged { profile, metadata } => canonical(profile) != canonical(metadata),
        }
    }
}

fn canonical(role: &Option<RoleString>) -> Role {
    role.as_ref().map_or(Role::Unknown, RoleString::canonical)
}

/// Row of a staff directory or user-management table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub user_id: Uuid,
    pub display_name: String,
    pub role: RoleString,
}
