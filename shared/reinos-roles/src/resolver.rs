//! Permission resolution between an acting user and a target.
//!
//! Two comparison semantics are kept apart:
//! - Mutations (edit, delete, role change) use a strict rank comparison:
//!   nobody acts on a peer.
//! - Staff listings use a non-strict comparison: staff see their peers.

use serde::{Deserialize, Serialize};

use crate::canonical::canonicalize_str;
use crate::decision::{PermissionDecision, PermissionError};
use crate::hierarchy::Role;

/// Action evaluated against a target user or their content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Change the target's role.
    EditRole,
    /// Edit the target's profile.
    EditProfile,
    /// Delete the target's account.
    DeleteUser,
    /// Delete a topic, reply or message authored by the target.
    DeleteContent,
    /// See the target in a staff or user-management listing.
    ViewListing,
}

impl Action {
    /// Name used in log fields.
    #[must_use]
    pub const fn action_name(self) -> &'static str {
        match self {
            Self::EditRole => "edit_role",
            Self::EditProfile => "edit_profile",
            Self::DeleteUser => "delete_user",
            Self::DeleteContent => "delete_content",
            Self::ViewListing => "view_listing",
        }
    }

    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::EditRole,
            Self::EditProfile,
            Self::DeleteUser,
            Self::DeleteContent,
            Self::ViewListing,
        ]
    }

    /// Whether the action changes state, and so follows the strict rules.
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        !matches!(self, Self::ViewListing)
    }
}

/// Check whether `caller` may perform `action` on `target`.
///
/// Mutations, in order:
/// 1. `autor` targets are immune, whoever the caller is
/// 2. `admin` targets can only be touched by `autor`
/// 3. otherwise the caller must strictly outrank the target
///
/// [`Action::ViewListing`] follows [`check_listing`] instead.
pub const fn check_modify(
    caller: Role,
    target: Role,
    action: Action,
) -> Result<(), PermissionError> {
    if !action.is_mutation() {
        return check_listing(caller, target);
    }

    // Explicit guard: must hold even if the rank table changes.
    if matches!(target, Role::Autor) {
        return Err(PermissionError::TargetImmune { target });
    }

    if matches!(target, Role::Admin) && !matches!(caller, Role::Autor) {
        return Err(PermissionError::TargetRequiresAutor { caller });
    }

    if !caller.outranks(target) {
        return Err(PermissionError::InsufficientRank {
            caller_rank: caller.rank(),
            target_rank: target.rank(),
        });
    }

    Ok(())
}

/// Check whether `target` shows up in a listing requested by `caller`.
///
/// `autor` sees everyone, including other `autor` accounts. `autor` accounts
/// are hidden from everyone else. Otherwise the caller must rank the same as
/// or above the target.
pub const fn check_listing(caller: Role, target: Role) -> Result<(), PermissionError> {
    if matches!(caller, Role::Autor) {
        return Ok(());
    }

    if matches!(target, Role::Autor) {
        return Err(PermissionError::TargetImmune { target });
    }

    if !caller.outranks_or_equals(target) {
        return Err(PermissionError::InsufficientRank {
            caller_rank: caller.rank(),
            target_rank: target.rank(),
        });
    }

    Ok(())
}

/// Evaluate `action` for two raw role strings.
#[must_use]
pub fn can_modify(caller: &str, target: &str, action: Action) -> PermissionDecision {
    can_modify_roles(canonicalize_str(caller), canonicalize_str(target), action)
}

/// Evaluate `action` for two canonical roles.
#[must_use]
pub fn can_modify_roles(caller: Role, target: Role, action: Action) -> PermissionDecision {
    let result = check_modify(caller, target, action);
    if let Err(e) = &result {
        tracing::debug!(
            %caller,
            %target,
            action = action.action_name(),
            reason = %e.reason(),
            "Permission denied"
        );
    }
    result.into()
}

/// Listing visibility for two raw role strings.
#[must_use]
pub fn is_visible_in_listing(caller: &str, target: &str) -> bool {
    visible_in_listing(canonicalize_str(caller), canonicalize_str(target))
}

/// Listing visibility for two canonical roles.
#[must_use]
pub fn visible_in_listing(caller: Role, target: Role) -> bool {
    check_listing(caller, target).is_ok()
}

/// Keep only the rows `caller` may see. `role_of` extracts each row's role.
pub fn filter_listing<T, I, F>(caller: Role, rows: I, role_of: F) -> impl Iterator<Item = T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> Role,
{
    rows.into_iter()
        .filter(move |row| visible_in_listing(caller, role_of(row)))
}
