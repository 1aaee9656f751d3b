//! Role mutation gate.
//!
//! Restricts which new roles a caller may hand out. Runs in addition to the
//! rank check in [`crate::resolver`]; both must pass.

use crate::canonical::canonicalize_str;
use crate::decision::{PermissionDecision, PermissionError};
use crate::hierarchy::{Role, RoleSet};
use crate::resolver::{check_modify, Action};

/// Roles `caller` may assign. `autor` is never assignable.
#[must_use]
pub fn assignable_roles(caller: Role) -> RoleSet {
    match caller {
        Role::Autor | Role::Admin => RoleSet::all().difference(RoleSet::AUTOR),
        Role::OficialReal => {
            RoleSet::GUARDA_REAL
                | RoleSet::VIAJANTE
                | RoleSet::BANIDO
                | RoleSet::CIDADAO
                | RoleSet::VETERANO
        }
        Role::GuardaReal => {
            RoleSet::VIAJANTE | RoleSet::BANIDO | RoleSet::CIDADAO | RoleSet::VETERANO
        }
        _ => RoleSet::empty(),
    }
}

/// Assignable roles for a raw caller role string.
#[must_use]
pub fn allowed_new_roles(caller: &str) -> RoleSet {
    assignable_roles(canonicalize_str(caller))
}

/// Check a role change from `target`'s current role to `requested`.
///
/// The rank check runs first, so when both checks fail the rank error is
/// reported.
pub fn check_role_change(
    caller: Role,
    target: Role,
    requested: Role,
) -> Result<(), PermissionError> {
    check_modify(caller, target, Action::EditRole)?;

    if !assignable_roles(caller).contains_role(requested) {
        return Err(PermissionError::RoleNotAssignable { caller, requested });
    }

    Ok(())
}

/// Evaluate a role change for raw caller and target role strings.
#[must_use]
pub fn attempt_role_change(caller: &str, target: &str, requested: Role) -> PermissionDecision {
    let caller = canonicalize_str(caller);
    let target = canonicalize_str(target);
    let result = check_role_change(caller, target, requested);
    if let Err(e) = &result {
        tracing::debug!(
            %caller,
            %target,
            %requested,
            reason = %e.reason(),
            "Role change denied"
        );
    }
    result.into()
}
