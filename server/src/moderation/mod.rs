//! Moderation and admin actions gated by the role hierarchy.
//!
//! Handlers resolve nothing themselves: they pass user ids to
//! [`ModerationService`], which reads roles from the authoritative profile
//! record and defers every decision to `reinos_roles`.

mod error;
mod service;
mod types;

pub use error::ModerationError;
pub use service::ModerationService;
pub use types::{RoleChange, RoleConsistency, StaffMember};
