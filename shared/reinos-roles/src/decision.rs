//! Permission decisions and denial reasons.

use serde::{Deserialize, Serialize};

use crate::hierarchy::Role;

/// Stable, machine-checkable reason code attached to every decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionReason {
    /// The action is permitted.
    Ok,
    /// Target is the top-authority role.
    TargetImmune,
    /// Target is an admin and the caller is not `autor`.
    TargetRequiresAutor,
    /// Caller does not outrank the target.
    InsufficientRank,
    /// Requested role is outside the caller's assignable set.
    RoleNotAssignable,
    /// A role string the caller expected to be known fell back to `default`.
    UnknownRole,
}

impl DecisionReason {
    /// Reason code as it appears in serialized decisions and logs.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::TargetImmune => "TARGET_IMMUNE",
            Self::TargetRequiresAutor => "TARGET_REQUIRES_AUTOR",
            Self::InsufficientRank => "INSUFFICIENT_RANK",
            Self::RoleNotAssignable => "ROLE_NOT_ASSIGNABLE",
            Self::UnknownRole => "UNKNOWN_ROLE",
        }
    }
}

impl std::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of a single permission evaluation. Computed fresh per action and
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDecision {
    pub allowed: bool,
    pub reason: DecisionReason,
}

impl PermissionDecision {
    #[must_use]
    pub const fn allow() -> Self {
        Self {
            allowed: true,
            reason: DecisionReason::Ok,
        }
    }

    #[must_use]
    pub const fn deny(reason: DecisionReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

impl From<Result<(), PermissionError>> for PermissionDecision {
    fn from(result: Result<(), PermissionError>) -> Self {
        match result {
            Ok(()) => Self::allow(),
            Err(e) => Self::deny(e.reason()),
        }
    }
}

/// Permission check errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    #[error("Target role {target} is immune to this action")]
    TargetImmune { target: Role },

    #[error("Only autor may act on an admin (your role: {caller})")]
    TargetRequiresAutor { caller: Role },

    #[error("Cannot act on rank {target_rank} (your rank: {caller_rank})")]
    InsufficientRank { caller_rank: i32, target_rank: i32 },

    #[error("Role {requested} cannot be assigned by {caller}")]
    RoleNotAssignable { caller: Role, requested: Role },

    #[error("Unknown role: {raw:?}")]
    UnknownRole { raw: String },
}

impl PermissionError {
    #[must_use]
    pub const fn reason(&self) -> DecisionReason {
        match self {
            Self::TargetImmune { .. } => DecisionReason::TargetImmune,
            Self::TargetRequiresAutor { .. } => DecisionReason::TargetRequiresAutor,
            Self::InsufficientRank { .. } => DecisionReason::InsufficientRank,
            Self::RoleNotAssignable { .. } => DecisionReason::RoleNotAssignable,
            Self::UnknownRole { .. } => DecisionReason::UnknownRole,
        }
    }
}
