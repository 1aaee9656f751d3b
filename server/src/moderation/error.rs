//! Moderation Error Types

use reinos_roles::{PermissionDecision, PermissionError};
use serde_json::json;
use uuid::Uuid;

use crate::store::{RoleRecord, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("{0}")]
    Denied(#[from] PermissionError),

    #[error("Role store error: {0}")]
    Store(#[from] StoreError),

    /// The first record was written, the second was not. The two copies now
    /// disagree until an operator resyncs them.
    #[error("Role for user {user_id} written to {written} but not to {failed}")]
    PartialUpdate {
        user_id: Uuid,
        written: RoleRecord,
        failed: RoleRecord,
        #[source]
        source: StoreError,
    },
}

impl ModerationError {
    /// Stable error code surfaced to the host handler.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Denied(e) => e.reason().code(),
            Self::Store(StoreError::Conflict) => "ROLE_CONFLICT",
            Self::Store(_) => "STORE_ERROR",
            Self::PartialUpdate { .. } => "PARTIAL_UPDATE",
        }
    }

    /// Decision behind a denial.
    #[must_use]
    pub const fn decision(&self) -> Option<PermissionDecision> {
        match self {
            Self::Denied(e) => Some(PermissionDecision::deny(e.reason())),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }

    /// JSON body for the host handler's error response. Store failures are
    /// not described to the client.
    #[must_use]
    pub fn error_body(&self) -> serde_json::Value {
        match self {
            Self::Denied(e) => json!({ "error": self.code(), "message": e.to_string() }),
            Self::Store(e @ StoreError::Conflict) => {
                json!({ "error": self.code(), "message": e.to_string() })
            }
            Self::Store(e) => {
                tracing::error!(error = %e, "Role store error");
                json!({ "error": self.code(), "message": "Internal server error" })
            }
            Self::PartialUpdate { user_id, .. } => {
                tracing::error!(error = %self, %user_id, "Partial role update");
                json!({
                    "error": self.code(),
                    "message": "Role was only partially updated",
                    "user_id": user_id,
                })
            }
        }
    }
}
