//! Reinos Role Library
//!
//! Role hierarchy and permission resolution shared by the moderation and
//! admin handlers. Pure and synchronous: every function maps role strings to
//! a decision without I/O, so it can be called from any request context.
//!
//! Flow for a single action:
//! 1. [`canonicalize`] both role strings
//! 2. [`can_modify`] applies immunity, escalation and rank rules
//! 3. for role changes, [`attempt_role_change`] also applies the assignable
//!    role allow-list

pub mod canonical;
pub mod decision;
pub mod gate;
pub mod hierarchy;
pub mod resolver;

pub use canonical::{canonicalize, canonicalize_str, expect_known_role, RoleString};
pub use decision::{DecisionReason, PermissionDecision, PermissionError};
pub use gate::{allowed_new_roles, assignable_roles, attempt_role_change, check_role_change};
pub use hierarchy::{Role, RoleSet, RANK_TABLE_VERSION};
pub use resolver::{
    can_modify, can_modify_roles, check_listing, check_modify, filter_listing,
    is_visible_in_listing, visible_in_listing, Action,
};
